//! Minimal GLSL declaration scanner for the headless backends.
//!
//! Without a driver there is nobody to report attribute and uniform names, so
//! the dummy and recording backends read global declarations straight from
//! the source text.

/// Vertex inputs (`in` / `attribute`) declared in `source`, in order.
pub(crate) fn declared_inputs(source: &str) -> Vec<String> {
    declarations(source, &["in", "attribute"])
}

/// Uniforms declared in `source`, in order. Array suffixes are stripped.
pub(crate) fn declared_uniforms(source: &str) -> Vec<String> {
    declarations(source, &["uniform"])
}

/// Whether `source` defines an entry point.
pub(crate) fn has_entry_point(source: &str) -> bool {
    strip_comments(source).contains("void main")
}

fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| line.split("//").next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

fn declarations(source: &str, keywords: &[&str]) -> Vec<String> {
    strip_comments(source)
        .split(';')
        .filter_map(|statement| {
            let tokens: Vec<&str> = statement.split_whitespace().collect();
            let keyword = tokens.iter().position(|t| keywords.contains(t))?;
            // Need at least a type and a name after the qualifier.
            if tokens.len() < keyword + 3 {
                return None;
            }
            let name = tokens.last()?;
            let name = name.split('[').next().unwrap_or(name);
            Some(name.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = r#"
        #version 330
        // in vec2 commented_out;
        layout(location = 0) in vec3 NG_VertexPos;
        in vec2 NG_VertexTexCoord;
        in vec4 NG_VertexColor;
        uniform mat4 NGU_MATRIX_MVP;
        out vec4 fragColor;
        void main() { gl_Position = NGU_MATRIX_MVP * vec4(NG_VertexPos, 1.0); }
    "#;

    #[test]
    fn test_declared_inputs() {
        assert_eq!(
            declared_inputs(VERTEX),
            vec!["NG_VertexPos", "NG_VertexTexCoord", "NG_VertexColor"]
        );
    }

    #[test]
    fn test_declared_uniforms_strip_arrays() {
        let fragment = "uniform sampler2D NGU_TEXTURE[8];\nvoid main() {}";
        assert_eq!(declared_uniforms(VERTEX), vec!["NGU_MATRIX_MVP"]);
        assert_eq!(declared_uniforms(fragment), vec!["NGU_TEXTURE"]);
    }

    #[test]
    fn test_legacy_attribute_keyword() {
        let source = "attribute vec2 a_position;\nattribute vec4 a_color;";
        assert_eq!(declared_inputs(source), vec!["a_position", "a_color"]);
    }

    #[test]
    fn test_entry_point() {
        assert!(has_entry_point(VERTEX));
        assert!(!has_entry_point("// void main\nin vec2 pos;"));
    }
}
