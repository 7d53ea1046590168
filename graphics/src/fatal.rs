//! Fatal diagnostics.
//!
//! A fatal error is a programming mistake in the caller: binding texture unit
//! 9, writing past a buffer's capacity, freeing a resource twice. Execution
//! cannot meaningfully continue, so the message is logged under the
//! component's name and the current thread panics with the same text.

/// Log an error for `component` and panic with the formatted message.
///
/// ```should_panic
/// ngine_graphics::fatal!("GraphicsDevice", "texture unit {} is out of range", 9);
/// ```
#[macro_export]
macro_rules! fatal {
    ($component:expr, $($arg:tt)+) => {{
        let message = ::std::format!($($arg)+);
        $crate::__log::error!("{}: {}", $component, message);
        ::std::panic!("{}: {}", $component, message)
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    #[should_panic(expected = "GraphicsDevice: unit 9 out of range")]
    fn test_fatal_prefixes_component() {
        fatal!("GraphicsDevice", "unit {} out of range", 9);
    }

    #[test]
    fn test_fatal_is_an_expression() {
        fn pick(flag: bool) -> u32 {
            if flag {
                1
            } else {
                fatal!("Test", "unreachable branch")
            }
        }
        assert_eq!(pick(true), 1);
    }
}
