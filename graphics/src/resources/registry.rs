//! Generational registry of backend objects.
//!
//! Every GPU object the device creates gets a slot here. The public handle
//! types only carry a [`ResourceId`]; the backend handles live in the
//! registry so they can be reset once the object is destroyed. A destroyed
//! slot is reused under a new generation, so stale ids never alias a newer
//! resource.

use std::fmt;
use std::sync::Arc;

use crate::layout::VertexLayout;
use crate::types::{BufferDescriptor, ShaderStage, TextureDescriptor};

/// Backend object name. [`GpuHandle::NULL`] means "no object".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct GpuHandle(pub u32);

impl GpuHandle {
    /// The unallocated handle.
    pub const NULL: Self = Self(0);

    /// Whether this handle names no object.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for GpuHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a registered resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    index: u32,
    generation: u32,
}

impl ResourceId {
    /// An id that never resolves to a resource.
    pub const INVALID: Self = Self {
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// Slot index.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Kind of GPU object behind a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Buffer,
    Shader,
    ShaderProgram,
    VertexArray,
    Texture,
    RenderTarget,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Lifecycle stage of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Usable.
    Live,
    /// Freed by the caller, waiting for the GPU to finish with it.
    Queued,
    /// Backend object deleted. Terminal.
    Destroyed,
}

/// Backend handles and bookkeeping for one resource, tagged by kind.
#[derive(Debug, Clone)]
pub enum RawResource {
    Buffer {
        handle: GpuHandle,
        descriptor: BufferDescriptor,
    },
    Shader {
        handle: GpuHandle,
        stage: ShaderStage,
    },
    ShaderProgram {
        handle: GpuHandle,
        layout: Arc<VertexLayout>,
        sampler_uniform: Option<String>,
        sampler_count: u32,
        shaders: Vec<ResourceId>,
        linked: bool,
    },
    /// `handle` is NULL on backends without vertex array objects.
    VertexArray {
        handle: GpuHandle,
        vertex_buffer: ResourceId,
        index_buffer: Option<ResourceId>,
        layout: Arc<VertexLayout>,
    },
    Texture {
        handle: GpuHandle,
        descriptor: TextureDescriptor,
    },
    /// The color texture is registered separately and owned by the target.
    RenderTarget {
        framebuffer: GpuHandle,
        depth_buffer: GpuHandle,
        texture: ResourceId,
        width: u32,
        height: u32,
    },
}

impl RawResource {
    /// Kind tag.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Buffer { .. } => ResourceKind::Buffer,
            Self::Shader { .. } => ResourceKind::Shader,
            Self::ShaderProgram { .. } => ResourceKind::ShaderProgram,
            Self::VertexArray { .. } => ResourceKind::VertexArray,
            Self::Texture { .. } => ResourceKind::Texture,
            Self::RenderTarget { .. } => ResourceKind::RenderTarget,
        }
    }

    /// Primary backend handle (the framebuffer for render targets).
    pub fn handle(&self) -> GpuHandle {
        match self {
            Self::Buffer { handle, .. }
            | Self::Shader { handle, .. }
            | Self::ShaderProgram { handle, .. }
            | Self::VertexArray { handle, .. }
            | Self::Texture { handle, .. } => *handle,
            Self::RenderTarget { framebuffer, .. } => *framebuffer,
        }
    }
}

#[derive(Debug)]
struct Entry {
    resource: RawResource,
    queued: bool,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Slot map of every resource a device owns.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource and return its id.
    pub fn insert(&mut self, resource: RawResource) -> ResourceId {
        let entry = Some(Entry {
            resource,
            queued: false,
        });
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = entry;
            return ResourceId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry,
        });
        ResourceId {
            index,
            generation: 0,
        }
    }

    fn entry(&self, id: ResourceId) -> Option<&Entry> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, id: ResourceId) -> Option<&mut Entry> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    /// Look up a resource that has not been destroyed yet.
    pub fn get(&self, id: ResourceId) -> Option<&RawResource> {
        self.entry(id).map(|entry| &entry.resource)
    }

    /// Mutable lookup of a resource that has not been destroyed yet.
    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut RawResource> {
        self.entry_mut(id).map(|entry| &mut entry.resource)
    }

    /// Look up a resource that is still usable.
    pub fn get_live(&self, id: ResourceId) -> Option<&RawResource> {
        self.entry(id)
            .filter(|entry| !entry.queued)
            .map(|entry| &entry.resource)
    }

    /// Lifecycle stage of `id`. Unknown and stale ids report `Destroyed`.
    pub fn state(&self, id: ResourceId) -> ResourceState {
        match self.entry(id) {
            Some(entry) if entry.queued => ResourceState::Queued,
            Some(_) => ResourceState::Live,
            None => ResourceState::Destroyed,
        }
    }

    /// Move a live resource to the queued stage. Returns the previous state.
    pub fn mark_queued(&mut self, id: ResourceId) -> ResourceState {
        match self.entry_mut(id) {
            Some(entry) if entry.queued => ResourceState::Queued,
            Some(entry) => {
                entry.queued = true;
                ResourceState::Live
            }
            None => ResourceState::Destroyed,
        }
    }

    /// Remove a resource, invalidating its id permanently.
    pub fn remove(&mut self, id: ResourceId) -> Option<RawResource> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(entry.resource)
    }

    /// Number of resources not yet destroyed.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the registry holds no resources.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Ids of every resource not yet destroyed.
    pub fn ids(&self) -> Vec<ResourceId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.entry.is_some())
            .map(|(index, slot)| ResourceId {
                index: index as u32,
                generation: slot.generation,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shader(handle: u32) -> RawResource {
        RawResource::Shader {
            handle: GpuHandle(handle),
            stage: ShaderStage::Vertex,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut registry = ResourceRegistry::new();
        let id = registry.insert(shader(7));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.state(id), ResourceState::Live);
        let resource = registry.get(id).unwrap();
        assert_eq!(resource.kind(), ResourceKind::Shader);
        assert_eq!(resource.handle(), GpuHandle(7));
    }

    #[test]
    fn test_remove_invalidates_id() {
        let mut registry = ResourceRegistry::new();
        let id = registry.insert(shader(1));

        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert_eq!(registry.state(id), ResourceState::Destroyed);
        assert!(registry.get(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut registry = ResourceRegistry::new();
        let first = registry.insert(shader(1));
        registry.remove(first);
        let second = registry.insert(shader(2));

        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());
        assert!(registry.get(first).is_none());
        assert_eq!(registry.get(second).unwrap().handle(), GpuHandle(2));
    }

    #[test]
    fn test_mark_queued() {
        let mut registry = ResourceRegistry::new();
        let id = registry.insert(shader(3));

        assert_eq!(registry.mark_queued(id), ResourceState::Live);
        assert_eq!(registry.mark_queued(id), ResourceState::Queued);
        assert_eq!(registry.state(id), ResourceState::Queued);
        assert!(registry.get_live(id).is_none());
        assert!(registry.get(id).is_some());

        registry.remove(id);
        assert_eq!(registry.mark_queued(id), ResourceState::Destroyed);
    }

    #[test]
    fn test_invalid_id() {
        let registry = ResourceRegistry::new();
        assert_eq!(registry.state(ResourceId::INVALID), ResourceState::Destroyed);
        assert_eq!(ResourceId::INVALID.to_string(), "#4294967295v4294967295");
    }

    #[test]
    fn test_ids() {
        let mut registry = ResourceRegistry::new();
        let a = registry.insert(shader(1));
        let b = registry.insert(shader(2));
        registry.remove(a);
        assert_eq!(registry.ids(), vec![b]);
    }
}
