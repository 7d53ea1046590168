//! Vertex attribute binding cache.
//!
//! Attribute pointers depend on both the vertex array and the program bound
//! with it, so they are configured lazily when the pair changes. With vertex
//! array objects the attribute state lives inside each VAO and is cached per
//! array. Without them there is a single global attribute state, and only the
//! last configured pair is remembered.

use std::collections::HashMap;

use crate::resources::{GpuHandle, ResourceId};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Configured {
    /// Program the attributes were configured for, NULL when unconfigured.
    program: GpuHandle,
    /// Attribute locations currently enabled.
    enabled: Vec<u32>,
}

/// Which (array, program) pairs have their attributes configured.
#[derive(Debug)]
pub enum AttributeCache {
    /// Attribute state is stored in each vertex array object.
    PerArray(HashMap<ResourceId, Configured>),
    /// Attribute state is global.
    Global(Option<(ResourceId, Configured)>),
}

impl AttributeCache {
    pub fn new(vertex_array_objects: bool) -> Self {
        if vertex_array_objects {
            Self::PerArray(HashMap::new())
        } else {
            Self::Global(None)
        }
    }

    /// Start configuring `array` for `program`.
    ///
    /// Returns `None` if the pair is already configured. Otherwise returns the
    /// locations that must be disabled first and marks the array unconfigured
    /// until [`AttributeCache::finish`] is called.
    pub fn begin(&mut self, array: ResourceId, program: GpuHandle) -> Option<Vec<u32>> {
        let configured = match self {
            Self::PerArray(arrays) => arrays.entry(array).or_default(),
            Self::Global(slot) => {
                let stale = slot.as_ref().is_none_or(|(id, _)| *id != array);
                if stale {
                    let previous = slot.take().map(|(_, c)| c.enabled).unwrap_or_default();
                    *slot = Some((
                        array,
                        Configured {
                            program: GpuHandle::NULL,
                            enabled: previous,
                        },
                    ));
                }
                match slot {
                    Some((_, configured)) => configured,
                    None => return Some(Vec::new()),
                }
            }
        };
        if !program.is_null() && configured.program == program {
            return None;
        }
        configured.program = GpuHandle::NULL;
        Some(std::mem::take(&mut configured.enabled))
    }

    /// Record that `array` is now configured for `program`.
    pub fn finish(&mut self, array: ResourceId, program: GpuHandle, enabled: Vec<u32>) {
        let configured = Configured { program, enabled };
        match self {
            Self::PerArray(arrays) => {
                arrays.insert(array, configured);
            }
            Self::Global(slot) => *slot = Some((array, configured)),
        }
    }

    /// Drop everything known about a deleted vertex array.
    pub fn forget_array(&mut self, array: ResourceId) {
        match self {
            Self::PerArray(arrays) => {
                arrays.remove(&array);
            }
            Self::Global(slot) => {
                // The enabled locations are global state and still need disabling.
                if let Some((id, configured)) = slot
                    && *id == array
                {
                    *id = ResourceId::INVALID;
                    configured.program = GpuHandle::NULL;
                }
            }
        }
    }

    /// Invalidate every entry configured for a deleted program.
    pub fn forget_program(&mut self, program: GpuHandle) {
        let reset = |configured: &mut Configured| {
            if configured.program == program {
                configured.program = GpuHandle::NULL;
            }
        };
        match self {
            Self::PerArray(arrays) => arrays.values_mut().for_each(reset),
            Self::Global(slot) => {
                if let Some((_, configured)) = slot {
                    reset(configured);
                }
            }
        }
    }

    /// Whether `array` is configured for `program`.
    pub fn is_configured(&self, array: ResourceId, program: GpuHandle) -> bool {
        let configured = match self {
            Self::PerArray(arrays) => arrays.get(&array),
            Self::Global(slot) => slot
                .as_ref()
                .filter(|(id, _)| *id == array)
                .map(|(_, configured)| configured),
        };
        configured.is_some_and(|c| !program.is_null() && c.program == program)
    }
}
