pub use crate::ds::{EntryArena, EntryId, TimestampHeap};
pub use crate::error::StaleHandleError;
pub use crate::tracker::IdleTracker;

#[cfg(feature = "concurrency")]
pub use crate::ds::ConcurrentTimestampHeap;
