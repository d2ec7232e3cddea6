//! Change notifications.

use crate::tracked::ObjectHandle;

/// Buffered notifications per receiver before a slow receiver starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Something happened to a cached object.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A new identity entered the cache.
    Added(ObjectHandle),
    /// An authoritative payload changed the object's state.
    Updated(ObjectHandle),
    /// The object became a tombstone.
    Deleted(ObjectHandle),
}

impl CacheEvent {
    pub fn handle(&self) -> &ObjectHandle {
        match self {
            CacheEvent::Added(h) | CacheEvent::Updated(h) | CacheEvent::Deleted(h) => h,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CacheEvent::Added(_) => "added",
            CacheEvent::Updated(_) => "updated",
            CacheEvent::Deleted(_) => "deleted",
        }
    }
}
