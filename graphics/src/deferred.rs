//! Deferred resource destruction.
//!
//! The GPU consumes submitted work after the CPU has moved on, so a resource
//! freed while recording frame N may still be read by the commands of frame
//! N. Freed resources are therefore parked in a frame-indexed ring and only
//! handed back for destruction once enough presents have passed.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │               DeferredFreeQueue               │
//! │  ┌──────────┐  ┌──────────┐                   │
//! │  │ Frame N  │  │ Frame N+1│  ...  (grace + 1) │
//! │  │ pending  │  │ pending  │                   │
//! │  └──────────┘  └──────────┘                   │
//! └───────────────────────────────────────────────┘
//!
//! On free(resource):
//!   1. Mark the resource queued
//!   2. Append its id to the current frame's list
//!
//! On present (after the buffer swap):
//!   1. Advance the frame counter
//!   2. Return the list that has aged `frames_of_grace` presents
//!   3. The device destroys the returned resources
//! ```
//!
//! With the default single frame of grace a resource freed during frame N is
//! destroyed at the present that ends frame N+1.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::resources::{GraphicsResource, ResourceId};

const COMPONENT: &str = "DeferredFreeQueue";

/// Presents a freed resource survives when nothing else is configured.
pub const DEFAULT_FRAMES_OF_GRACE: usize = 1;

#[derive(Debug)]
struct PendingFrames {
    frame: u64,
    lists: Vec<Vec<ResourceId>>,
    queued: HashSet<ResourceId>,
}

impl PendingFrames {
    fn slot(&self, frame: u64) -> usize {
        (frame % self.lists.len() as u64) as usize
    }
}

/// Frame-indexed ring of resources waiting to be destroyed.
///
/// Enqueueing is lock-guarded and may happen from any thread; advancing the
/// frame and draining happen on the render thread.
#[derive(Debug)]
pub struct DeferredFreeQueue {
    pending: Mutex<PendingFrames>,
    frames_of_grace: usize,
}

impl DeferredFreeQueue {
    /// Create a queue that holds resources for `frames_of_grace` presents.
    ///
    /// Panics if `frames_of_grace` is zero.
    pub fn new(frames_of_grace: usize) -> Self {
        if frames_of_grace == 0 {
            fatal!(COMPONENT, "at least one frame of grace is required");
        }
        Self {
            pending: Mutex::new(PendingFrames {
                frame: 0,
                lists: vec![Vec::new(); frames_of_grace + 1],
                queued: HashSet::new(),
            }),
            frames_of_grace,
        }
    }

    /// Presents a queued resource survives.
    pub fn frames_of_grace(&self) -> usize {
        self.frames_of_grace
    }

    /// Queue `id` on the current frame's list.
    ///
    /// Panics if `id` is already queued.
    pub fn enqueue(&self, id: ResourceId) {
        let mut pending = self.pending.lock();
        if !pending.queued.insert(id) {
            fatal!(COMPONENT, "resource {id} is already queued for destruction");
        }
        let slot = pending.slot(pending.frame);
        pending.lists[slot].push(id);
        log::trace!("{COMPONENT}: queued {id} in frame {}", pending.frame);
    }

    /// Whether `id` is waiting for destruction.
    pub fn is_queued(&self, id: ResourceId) -> bool {
        self.pending.lock().queued.contains(&id)
    }

    /// Move to the next frame and return the resources whose grace has expired.
    pub fn advance_frame(&self) -> Vec<ResourceId> {
        let mut pending = self.pending.lock();
        pending.frame += 1;
        // The new frame reuses the oldest slot in the ring.
        let slot = pending.slot(pending.frame);
        let ready = std::mem::take(&mut pending.lists[slot]);
        for id in &ready {
            pending.queued.remove(id);
        }
        if !ready.is_empty() {
            log::trace!(
                "{COMPONENT}: {} resources ready at frame {}",
                ready.len(),
                pending.frame
            );
        }
        ready
    }

    /// Empty every list immediately, oldest first.
    pub fn drain_all(&self) -> Vec<ResourceId> {
        let mut pending = self.pending.lock();
        let len = pending.lists.len() as u64;
        let frame = pending.frame;
        let mut ready = Vec::new();
        for age in (0..len).rev() {
            let slot = pending.slot(frame + len - age);
            ready.append(&mut pending.lists[slot]);
        }
        pending.queued.clear();
        ready
    }

    /// Number of resources waiting for destruction.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().queued.len()
    }

    /// Number of presents since the queue was created.
    pub fn current_frame(&self) -> u64 {
        self.pending.lock().frame
    }
}

/// Thread-safe handle for freeing resources from outside the render thread.
///
/// Obtained from [`GraphicsDevice::releaser`](crate::GraphicsDevice::releaser).
/// Resources released here are destroyed by the device during a later
/// present, after the same grace period as [`GraphicsDevice::free`].
///
/// [`GraphicsDevice::free`]: crate::GraphicsDevice::free
#[derive(Debug, Clone)]
pub struct ResourceReleaser {
    queue: Arc<DeferredFreeQueue>,
}

impl ResourceReleaser {
    pub(crate) fn new(queue: Arc<DeferredFreeQueue>) -> Self {
        Self { queue }
    }

    /// Queue a resource for destruction, consuming its handle.
    pub fn release<R: GraphicsResource>(&self, resource: R) {
        let id = resource.id();
        log::trace!(
            "ResourceReleaser: releasing {} {id}",
            resource.kind()
        );
        self.queue.enqueue(id);
    }
}

static_assertions::assert_impl_all!(DeferredFreeQueue: Send, Sync);
static_assertions::assert_impl_all!(ResourceReleaser: Send, Sync);
