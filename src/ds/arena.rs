use std::fmt;

/// Handle to an entry in an [`EntryArena`].
///
/// Carries the slot index plus the generation the slot had when the entry
/// was inserted. A handle whose generation no longer matches the slot's is
/// stale: the entry was removed, and the slot may since have been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId {
    slot: u32,
    r#gen: u32,
}

impl EntryId {
    /// Returns the raw slot index (stable for the lifetime of the entry).
    pub fn index(self) -> usize {
        self.slot as usize
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.slot, self.r#gen)
    }
}

#[derive(Debug)]
struct Slot<T> {
    r#gen: u32,
    value: Option<T>,
}

/// Slot arena with generational handles.
///
/// Like a plain free-list arena, but each slot carries a generation counter
/// that is bumped on removal, so a handle outliving its entry is detected
/// instead of silently resolving to whatever reused the slot.
#[derive(Debug)]
pub struct EntryArena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> EntryArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> EntryId {
        let slot = if let Some(slot) = self.free_list.pop() {
            self.slots[slot as usize].value = Some(value);
            slot
        } else {
            self.slots.push(Slot {
                r#gen: 0,
                value: Some(value),
            });
            (self.slots.len() - 1) as u32
        };
        self.len += 1;
        EntryId {
            slot,
            r#gen: self.slots[slot as usize].r#gen,
        }
    }

    /// Removes the entry for `id`, invalidating the handle and every copy
    /// of it.
    pub fn remove(&mut self, id: EntryId) -> Option<T> {
        let slot = self.slots.get_mut(id.slot as usize)?;
        if slot.r#gen != id.r#gen {
            return None;
        }
        let value = slot.value.take()?;
        slot.r#gen = slot.r#gen.wrapping_add(1);
        self.free_list.push(id.slot);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: EntryId) -> Option<&T> {
        let slot = self.slots.get(id.slot as usize)?;
        if slot.r#gen != id.r#gen {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.slot as usize)?;
        if slot.r#gen != id.r#gen {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.value.take().is_some() {
                slot.r#gen = slot.r#gen.wrapping_add(1);
            }
        }
        self.free_list.clear();
        self.free_list
            .extend((0..self.slots.len() as u32).rev());
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &T)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    EntryId {
                        slot: idx as u32,
                        r#gen: slot.r#gen,
                    },
                    value,
                )
            })
        })
    }
}

impl<T> Default for EntryArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_insert_get_remove() {
        let mut arena = EntryArena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));

        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(a), None);
    }

    #[test]
    fn arena_stale_handle_after_reuse() {
        let mut arena = EntryArena::new();
        let a = arena.insert("a");
        arena.remove(a);

        // Slot is recycled but the generation differs.
        let c = arena.insert("c");
        assert_eq!(a.index(), c.index());
        assert_ne!(a, c);
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.get(c), Some(&"c"));
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn arena_get_mut_updates_in_place() {
        let mut arena = EntryArena::new();
        let id = arena.insert(10);
        *arena.get_mut(id).unwrap() = 20;
        assert_eq!(arena.get(id), Some(&20));
    }

    #[test]
    fn arena_clear_invalidates_all_handles() {
        let mut arena = EntryArena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        arena.clear();
        assert!(arena.is_empty());
        assert!(!arena.contains(a));
        assert!(!arena.contains(b));

        let c = arena.insert(3);
        assert_eq!(arena.get(c), Some(&3));
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn arena_iter_skips_free_slots() {
        let mut arena = EntryArena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        arena.insert("c");
        arena.remove(b);

        let live: Vec<_> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(live, vec!["a", "c"]);
        assert!(arena.iter().any(|(id, _)| id == a));
    }
}
