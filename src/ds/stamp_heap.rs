//! Index-tracked timestamp min-heap.
//!
//! A binary min-heap over `i64` millisecond timestamps that supports
//! O(log n) priority updates *in place*. Every tracked entry records its
//! current slot in the heap array, so an update starts sifting from the
//! entry's known position instead of rebuilding or scanning.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                        TimestampHeap Layout                          │
//! │                                                                      │
//! │   order: Vec<HeapSlot>        (binary heap array, min stamp at [0])  │
//! │                                                                      │
//! │     [0]            (50, id_b)   ← oldest stamp, next to expire       │
//! │                   /           \                                      │
//! │     [1]  (100, id_a)       (200, id_c)  [2]                          │
//! │                                                                      │
//! │   entries: EntryArena<Entry>  (stable handles, position index)       │
//! │                                                                      │
//! │     ┌───────┬─────────┬──────┐                                       │
//! │     │  id   │  value  │ pos  │                                       │
//! │     ├───────┼─────────┼──────┤                                       │
//! │     │ id_a  │  "a"    │  1   │  ← entries[order[i].id].pos == i      │
//! │     │ id_b  │  "b"    │  0   │                                       │
//! │     │ id_c  │  "c"    │  2   │                                       │
//! │     └───────┴─────────┴──────┘                                       │
//! └──────────────────────────────────────────────────────────────────────┘
//!
//! Update Flow
//! ───────────
//!   update_stamp(id_b, 300):
//!     1. pos = entries[id_b].pos            (O(1) position lookup)
//!     2. order[pos].stamp = 300
//!     3. fix(pos): sift up if it now beats its parent, else sift down
//!     4. every swap rewrites pos for both moved entries
//! ```
//!
//! ## Operations
//!
//! | Operation       | Description                              | Complexity |
//! |-----------------|------------------------------------------|------------|
//! | `insert`        | Add entry, sift up                       | O(log n)   |
//! | `pop_oldest`    | Remove min-stamp entry, sift down        | O(log n)   |
//! | `peek_oldest`   | Min stamp without removal                | O(1)       |
//! | `update_stamp`  | Re-stamp an entry, fix in place          | O(log n)   |
//! | `remove`        | Remove an arbitrary entry by handle      | O(log n)   |
//! | `stamp_of`      | Current stamp for a handle               | O(1)       |
//!
//! ## Ordering
//!
//! Lower stamps sit closer to the root: `pop_oldest` always yields the
//! entry with the *smallest* (oldest) timestamp. Entries with equal stamps
//! pop in an unspecified relative order.
//!
//! ## Handle Staleness
//!
//! Handles are generational [`EntryId`]s. Once an entry leaves the heap
//! (pop or remove), every copy of its handle is stale: `update_stamp`
//! fails with [`StaleHandleError`] and the read accessors return `None`,
//! even after the underlying slot has been reused. There is no sentinel
//! stamp; absence is always expressed through `Option`/`Result`.
//!
//! ## Thread Safety
//!
//! `TimestampHeap` is not thread-safe. Use [`ConcurrentTimestampHeap`] or
//! wrap it in a mutex for shared access.
//!
//! ## Example Usage
//!
//! ```
//! use expirekit::ds::TimestampHeap;
//!
//! let mut heap: TimestampHeap<&str> = TimestampHeap::new();
//!
//! let a = heap.insert("a", 100);
//! heap.insert("b", 50);
//! heap.insert("c", 200);
//!
//! assert_eq!(heap.peek_oldest(), Some(50));
//!
//! // Re-stamp "a" as just-active; it moves behind "c".
//! heap.update_stamp(a, 900).unwrap();
//!
//! assert_eq!(heap.pop_oldest(), Some(("b", 50)));
//! assert_eq!(heap.pop_oldest(), Some(("c", 200)));
//! assert_eq!(heap.pop_oldest(), Some(("a", 900)));
//! assert_eq!(heap.pop_oldest(), None);
//! ```
use crate::ds::arena::{EntryArena, EntryId};
use crate::error::StaleHandleError;

#[derive(Debug, Clone, Copy)]
struct HeapSlot {
    stamp: i64,
    id: EntryId,
}

#[derive(Debug)]
struct Entry<T> {
    value: T,
    // Current slot in `order`; rewritten on every swap.
    pos: usize,
}

/// Min-heap of opaque values keyed by an `i64` millisecond timestamp.
///
/// The heap owns its entries exclusively; callers hold [`EntryId`] handles
/// for later [`update_stamp`](Self::update_stamp) and
/// [`remove`](Self::remove) calls. See the module docs for layout and
/// complexity details.
#[derive(Debug)]
pub struct TimestampHeap<T> {
    order: Vec<HeapSlot>,
    entries: EntryArena<Entry<T>>,
}

impl<T> TimestampHeap<T> {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: EntryArena::new(),
        }
    }

    /// Creates an empty heap with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            entries: EntryArena::with_capacity(capacity),
        }
    }

    /// Reserves capacity for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.order.reserve(additional);
        self.entries.reserve(additional);
    }

    /// Returns the number of tracked entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no entries are tracked.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the backing array's capacity.
    pub fn capacity(&self) -> usize {
        self.order.capacity()
    }

    /// Removes all entries, invalidating every outstanding handle.
    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    /// Returns `true` if `id` still refers to a tracked entry.
    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains(id)
    }

    /// Returns a reference to the value for `id`, if still tracked.
    pub fn get(&self, id: EntryId) -> Option<&T> {
        self.entries.get(id).map(|entry| &entry.value)
    }

    /// Returns the current stamp for `id`, if still tracked.
    pub fn stamp_of(&self, id: EntryId) -> Option<i64> {
        let pos = self.entries.get(id)?.pos;
        self.order.get(pos).map(|slot| slot.stamp)
    }

    /// Returns the oldest stamp without removing its entry.
    ///
    /// Never mutates the heap; two consecutive calls with no intervening
    /// mutation return the same answer. `None` when empty.
    pub fn peek_oldest(&self) -> Option<i64> {
        self.order.first().map(|slot| slot.stamp)
    }

    /// Inserts `value` with the given stamp and returns its handle.
    ///
    /// Duplicate stamps are permitted; their relative pop order is
    /// unspecified.
    pub fn insert(&mut self, value: T, stamp: i64) -> EntryId {
        let pos = self.order.len();
        let id = self.entries.insert(Entry { value, pos });
        self.order.push(HeapSlot { stamp, id });
        self.sift_up(pos);
        id
    }

    /// Removes and returns the entry with the oldest stamp.
    ///
    /// The last entry in the backing array replaces the root and sifts
    /// down. Returns `None` when empty; the popped handle becomes stale.
    pub fn pop_oldest(&mut self) -> Option<(T, i64)> {
        let root = *self.order.first()?;
        let last = self.order.pop()?;
        if !self.order.is_empty() {
            self.order[0] = last;
            self.set_pos(last.id, 0);
            self.sift_down(0);
        }
        let entry = self.entries.remove(root.id)?;
        Some((entry.value, root.stamp))
    }

    /// Sets a new stamp for `id` and fixes the heap around its position.
    ///
    /// Starts sifting from the entry's recorded slot rather than from the
    /// root, which is cheaper than remove-and-reinsert. Returns the
    /// previous stamp. Fails with [`StaleHandleError`] (heap untouched) if
    /// `id` was already popped or removed.
    pub fn update_stamp(&mut self, id: EntryId, stamp: i64) -> Result<i64, StaleHandleError> {
        let pos = match self.entries.get(id) {
            Some(entry) => entry.pos,
            None => return Err(StaleHandleError::new(id)),
        };
        let old = self.order[pos].stamp;
        self.order[pos].stamp = stamp;
        self.fix(pos);
        Ok(old)
    }

    /// Removes an arbitrary entry by handle, returning its value and
    /// stamp. `None` if the handle is stale.
    pub fn remove(&mut self, id: EntryId) -> Option<(T, i64)> {
        let pos = self.entries.get(id)?.pos;
        let removed = self.order[pos];
        let last = self.order.pop()?;
        if pos < self.order.len() {
            self.order[pos] = last;
            self.set_pos(last.id, pos);
            self.fix(pos);
        }
        let entry = self.entries.remove(removed.id)?;
        Some((entry.value, removed.stamp))
    }

    /// Iterates over `(handle, stamp, value)` in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, i64, &T)> {
        self.order.iter().filter_map(|slot| {
            self.entries
                .get(slot.id)
                .map(|entry| (slot.id, slot.stamp, &entry.value))
        })
    }

    fn set_pos(&mut self, id: EntryId, pos: usize) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.pos = pos;
        } else {
            debug_assert!(false, "heap slot references a missing arena entry");
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.order.swap(a, b);
        self.set_pos(self.order[a].id, a);
        self.set_pos(self.order[b].id, b);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.order[pos].stamp >= self.order[parent].stamp {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.order.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let mut child = left;
            let right = left + 1;
            if right < len && self.order[right].stamp < self.order[left].stamp {
                child = right;
            }
            if self.order[pos].stamp <= self.order[child].stamp {
                break;
            }
            self.swap(pos, child);
            pos = child;
        }
    }

    // Restore the heap property after a single-slot change, whichever
    // direction it violated.
    fn fix(&mut self, pos: usize) {
        if pos > 0 && self.order[pos].stamp < self.order[(pos - 1) / 2].stamp {
            self.sift_up(pos);
        } else {
            self.sift_down(pos);
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates internal invariants (debug/test builds only).
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.order.len(), self.entries.len());
        for (pos, slot) in self.order.iter().enumerate() {
            let entry = self
                .entries
                .get(slot.id)
                .expect("order slot must reference a live entry");
            assert_eq!(entry.pos, pos, "position index out of sync at {pos}");
            if pos > 0 {
                let parent = (pos - 1) / 2;
                assert!(
                    self.order[parent].stamp <= slot.stamp,
                    "heap property violated between {parent} and {pos}"
                );
            }
        }
    }
}

impl<T> Default for TimestampHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutex-wrapped [`TimestampHeap`] for shared access.
#[derive(Debug)]
pub struct ConcurrentTimestampHeap<T> {
    inner: parking_lot::Mutex<TimestampHeap<T>>,
}

impl<T> ConcurrentTimestampHeap<T> {
    pub fn new() -> Self {
        Self {
            inner: parking_lot::Mutex::new(TimestampHeap::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: parking_lot::Mutex::new(TimestampHeap::with_capacity(capacity)),
        }
    }

    pub fn insert(&self, value: T, stamp: i64) -> EntryId {
        let mut heap = self.inner.lock();
        heap.insert(value, stamp)
    }

    pub fn pop_oldest(&self) -> Option<(T, i64)> {
        let mut heap = self.inner.lock();
        heap.pop_oldest()
    }

    pub fn peek_oldest(&self) -> Option<i64> {
        let heap = self.inner.lock();
        heap.peek_oldest()
    }

    pub fn update_stamp(&self, id: EntryId, stamp: i64) -> Result<i64, StaleHandleError> {
        let mut heap = self.inner.lock();
        heap.update_stamp(id, stamp)
    }

    pub fn remove(&self, id: EntryId) -> Option<(T, i64)> {
        let mut heap = self.inner.lock();
        heap.remove(id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        let heap = self.inner.lock();
        heap.contains(id)
    }

    pub fn stamp_of(&self, id: EntryId) -> Option<i64> {
        let heap = self.inner.lock();
        heap.stamp_of(id)
    }

    pub fn len(&self) -> usize {
        let heap = self.inner.lock();
        heap.len()
    }

    pub fn is_empty(&self) -> bool {
        let heap = self.inner.lock();
        heap.is_empty()
    }

    pub fn clear(&self) {
        let mut heap = self.inner.lock();
        heap.clear();
    }
}

impl<T> Default for ConcurrentTimestampHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}
