//! Keyed inactivity tracker for expiring idle entries.
//!
//! Pairs a [`TimestampHeap`] with a key → handle index so callers can work
//! in terms of their own buffer keys instead of heap handles. Implemented
//! as a map plus a heap, the same layering as the heap-backed cache
//! policies this crate grew out of.
//!
//! ## Architecture
//!
//! ```text
//!   handles: FxHashMap<K, EntryId>       heap: TimestampHeap<K>
//!   ┌──────────┬────────┐               root ─► oldest last-activity
//!   │ "conn-1" │  id_1  │
//!   │ "conn-2" │  id_2  │               stamp = last-activity, ms epoch
//!   └──────────┴────────┘
//! ```
//!
//! ## Behavior
//! - `record(k, now)`: starts tracking `k`, or refreshes its stamp
//! - `pop_idle(now, window)`: pops the oldest key iff idle ≥ `window`
//! - `remove(k)`: untracks a key (e.g. its buffer was closed)
//!
//! The tracker decides nothing about *when* to sweep; callers poll
//! [`oldest_activity`](IdleTracker::oldest_activity) or
//! [`drain_idle`](IdleTracker::drain_idle) on their own schedule.
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::arena::EntryId;
use crate::ds::stamp_heap::TimestampHeap;

/// Tracks the last-activity timestamp of keyed entries and surfaces the
/// ones idle past a caller-chosen window, oldest first.
#[derive(Debug)]
pub struct IdleTracker<K> {
    heap: TimestampHeap<K>,
    handles: FxHashMap<K, EntryId>,
}

impl<K> IdleTracker<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            heap: TimestampHeap::new(),
            handles: FxHashMap::default(),
        }
    }

    /// Creates an empty tracker with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: TimestampHeap::with_capacity(capacity),
            handles: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns `true` if `key` is currently tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.handles.contains_key(key)
    }

    /// Returns `key`'s last recorded activity stamp, if tracked.
    pub fn last_activity(&self, key: &K) -> Option<i64> {
        let id = *self.handles.get(key)?;
        self.heap.stamp_of(id)
    }

    /// Returns the oldest last-activity stamp across all tracked keys.
    ///
    /// Useful for scheduling the next sweep. `None` when nothing is
    /// tracked.
    pub fn oldest_activity(&self) -> Option<i64> {
        self.heap.peek_oldest()
    }

    /// Records activity for `key` at `now_ms`, tracking it if new.
    pub fn record(&mut self, key: K, now_ms: i64) {
        if let Some(&id) = self.handles.get(&key)
            && self.heap.update_stamp(id, now_ms).is_ok()
        {
            return;
        }
        let id = self.heap.insert(key.clone(), now_ms);
        self.handles.insert(key, id);
    }

    /// Refreshes `key`'s stamp without tracking new keys.
    ///
    /// Returns `false` if `key` was not tracked.
    pub fn touch(&mut self, key: &K, now_ms: i64) -> bool {
        match self.handles.get(key) {
            Some(&id) => self.heap.update_stamp(id, now_ms).is_ok(),
            None => false,
        }
    }

    /// Stops tracking `key`. Returns `false` if it was not tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.handles.remove(key) {
            Some(id) => self.heap.remove(id).is_some(),
            None => false,
        }
    }

    /// Pops the oldest key iff it has been idle for at least
    /// `idle_after_ms` as of `now_ms`.
    ///
    /// Returns the key and its last-activity stamp. `None` means nothing
    /// is expired right now.
    pub fn pop_idle(&mut self, now_ms: i64, idle_after_ms: i64) -> Option<(K, i64)> {
        let oldest = self.heap.peek_oldest()?;
        if now_ms.saturating_sub(oldest) < idle_after_ms {
            return None;
        }
        let (key, stamp) = self.heap.pop_oldest()?;
        self.handles.remove(&key);
        Some((key, stamp))
    }

    /// Pops every key idle for at least `idle_after_ms`, oldest first.
    pub fn drain_idle(&mut self, now_ms: i64, idle_after_ms: i64) -> Vec<(K, i64)> {
        let mut expired = Vec::new();
        while let Some(entry) = self.pop_idle(now_ms, idle_after_ms) {
            expired.push(entry);
        }
        expired
    }

    /// Removes all tracked keys.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.handles.clear();
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates map/heap agreement (debug/test builds only).
    pub fn debug_validate_invariants(&self)
    where
        K: std::fmt::Debug,
    {
        self.heap.debug_validate_invariants();
        assert_eq!(self.handles.len(), self.heap.len());
        for (key, &id) in &self.handles {
            assert_eq!(self.heap.get(id), Some(key), "handle index out of sync");
        }
    }
}

impl<K> Default for IdleTracker<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_tracks_and_refreshes() {
        let mut tracker = IdleTracker::new();
        tracker.record("conn-1", 100);
        tracker.record("conn-2", 200);
        assert_eq!(tracker.len(), 2);

        // Refreshing does not duplicate the key.
        tracker.record("conn-1", 500);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.last_activity(&"conn-1"), Some(500));
        assert_eq!(tracker.oldest_activity(), Some(200));
        tracker.debug_validate_invariants();
    }

    #[test]
    fn touch_refuses_unknown_keys() {
        let mut tracker = IdleTracker::new();
        tracker.record("a", 10);

        assert!(tracker.touch(&"a", 20));
        assert!(!tracker.touch(&"missing", 20));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.last_activity(&"a"), Some(20));
    }

    #[test]
    fn pop_idle_honors_window() {
        let mut tracker = IdleTracker::new();
        tracker.record("old", 1_000);
        tracker.record("fresh", 9_000);

        // At t=10_000 with a 5s window, only "old" (idle 9s) qualifies.
        assert_eq!(tracker.pop_idle(10_000, 5_000), Some(("old", 1_000)));
        assert_eq!(tracker.pop_idle(10_000, 5_000), None);
        assert_eq!(tracker.len(), 1);
        tracker.debug_validate_invariants();
    }

    #[test]
    fn pop_idle_on_empty_tracker() {
        let mut tracker: IdleTracker<&str> = IdleTracker::new();
        assert_eq!(tracker.pop_idle(1_000, 0), None);
        assert_eq!(tracker.oldest_activity(), None);
    }

    #[test]
    fn drain_idle_returns_oldest_first() {
        let mut tracker = IdleTracker::new();
        tracker.record("b", 300);
        tracker.record("a", 100);
        tracker.record("c", 900);
        tracker.record("d", 9_500);

        let expired = tracker.drain_idle(10_000, 1_000);
        assert_eq!(expired, vec![("a", 100), ("b", 300), ("c", 900)]);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.contains(&"d"));
    }

    #[test]
    fn touch_rescues_key_from_expiry() {
        let mut tracker = IdleTracker::new();
        tracker.record("a", 100);
        tracker.record("b", 200);

        tracker.touch(&"a", 9_999);
        let expired = tracker.drain_idle(10_000, 1_000);
        assert_eq!(expired, vec![("b", 200)]);
        assert!(tracker.contains(&"a"));
    }

    #[test]
    fn remove_untracks_key() {
        let mut tracker = IdleTracker::new();
        tracker.record("a", 100);
        tracker.record("b", 200);

        assert!(tracker.remove(&"a"));
        assert!(!tracker.remove(&"a"));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.drain_idle(10_000, 0), vec![("b", 200)]);
        tracker.debug_validate_invariants();
    }

    #[test]
    fn clear_resets_everything() {
        let mut tracker = IdleTracker::new();
        tracker.record("a", 1);
        tracker.record("b", 2);
        tracker.clear();
        assert!(tracker.is_empty());
        assert!(!tracker.contains(&"a"));

        tracker.record("a", 5);
        assert_eq!(tracker.last_activity(&"a"), Some(5));
        tracker.debug_validate_invariants();
    }
}
