//! Error types for the expirekit library.
//!
//! ## Key Components
//!
//! - [`StaleHandleError`]: Returned when an operation receives a handle
//!   whose entry has already been popped or removed.
//!
//! Empty-heap conditions are not errors: `pop_oldest`/`peek_oldest` return
//! `Option::None`, since "nothing tracked right now" is an ordinary state,
//! and any in-band sentinel stamp would collide with the valid timestamp
//! domain.
//!
//! ## Example Usage
//!
//! ```
//! use expirekit::ds::TimestampHeap;
//!
//! let mut heap = TimestampHeap::new();
//! let id = heap.insert("buf", 100);
//! heap.pop_oldest();
//!
//! // The handle is stale once the entry leaves the heap.
//! let err = heap.update_stamp(id, 200).unwrap_err();
//! assert_eq!(err.handle(), id);
//! ```

use std::fmt;

use crate::ds::arena::EntryId;

/// Error returned when a handle no longer refers to a tracked entry.
///
/// Produced by [`TimestampHeap::update_stamp`](crate::ds::TimestampHeap::update_stamp)
/// for handles that were popped, removed, or belong to a cleared heap
/// generation. The failed operation leaves the heap unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleHandleError(EntryId);

impl StaleHandleError {
    /// Creates a new `StaleHandleError` for the offending handle.
    #[inline]
    pub fn new(handle: EntryId) -> Self {
        Self(handle)
    }

    /// Returns the handle that failed to resolve.
    #[inline]
    pub fn handle(&self) -> EntryId {
        self.0
    }
}

impl fmt::Display for StaleHandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle {} does not refer to a tracked entry", self.0)
    }
}

impl std::error::Error for StaleHandleError {}
