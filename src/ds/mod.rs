pub mod arena;
pub mod stamp_heap;

pub use arena::{EntryArena, EntryId};
#[cfg(feature = "concurrency")]
pub use stamp_heap::ConcurrentTimestampHeap;
pub use stamp_heap::TimestampHeap;
