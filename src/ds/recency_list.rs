//! Recency order for cache entries.
//!
//! A doubly linked list threaded through a [`SlotArena`]. One end is the most
//! recently used (MRU) entry, the other the least recently used (LRU) entry,
//! which is the next eviction victim.
//!
//! ```text
//!   mru ──► [D] ──older──► [A] ──older──► [C] ◄── lru
//!           [D] ◄──newer── [A] ◄──newer── [C]
//! ```
//!
//! New entries enter at the MRU end, a use moves an entry there
//! ([`touch`](RecencyList::touch)), and eviction takes from the LRU end
//! ([`pop_lru`](RecencyList::pop_lru)). Every operation is O(1) given a
//! [`SlotId`].

use super::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Link<T> {
    value: T,
    newer: Option<SlotId>,
    older: Option<SlotId>,
}

#[derive(Debug)]
pub struct RecencyList<T> {
    nodes: SlotArena<Link<T>>,
    mru: Option<SlotId>,
    lru: Option<SlotId>,
}

impl<T> RecencyList<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotArena::with_capacity(capacity),
            mru: None,
            lru: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mru.is_none()
    }

    /// The least recently used (LRU) entry: the one [`pop_lru`](Self::pop_lru)
    /// would take.
    pub fn lru(&self) -> Option<&T> {
        self.lru
            .and_then(|id| self.nodes.get(id))
            .map(|link| &link.value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.nodes.get(id).map(|link| &link.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.nodes.get_mut(id).map(|link| &mut link.value)
    }

    /// Inserts `value` as the most recently used (MRU) entry.
    pub fn push_mru(&mut self, value: T) -> SlotId {
        let id = self.nodes.insert(Link {
            value,
            newer: None,
            older: None,
        });
        self.link_as_mru(id);
        id
    }

    /// Marks `id` as most recently used. Returns `false` for a dead handle.
    pub fn touch(&mut self, id: SlotId) -> bool {
        if self.mru == Some(id) {
            return true;
        }
        if !self.unlink(id) {
            return false;
        }
        self.link_as_mru(id);
        true
    }

    /// Unlinks `id` from wherever it sits and returns its value.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        if !self.unlink(id) {
            return None;
        }
        self.nodes.release(id).map(|link| link.value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<T> {
        let id = self.lru?;
        self.remove(id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.mru = None;
        self.lru = None;
    }

    /// Iterates values MRU first; `.rev()` walks LRU first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            newest: self.mru,
            oldest: self.lru,
            remaining: self.len(),
        }
    }

    /// Follows the `older` links from the MRU end, yielding each handle.
    ///
    /// Unlike [`iter`](Self::iter) this trusts only the links, not the
    /// length, so a damaged chain shows up as a short or overlong walk.
    pub fn ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        std::iter::successors(self.mru, move |&id| {
            self.nodes.get(id).and_then(|link| link.older)
        })
    }

    fn link_as_mru(&mut self, id: SlotId) {
        let previous = self.mru;
        if let Some(link) = self.nodes.get_mut(id) {
            link.newer = None;
            link.older = previous;
        }
        match previous {
            Some(prev) => {
                if let Some(link) = self.nodes.get_mut(prev) {
                    link.newer = Some(id);
                }
            },
            None => self.lru = Some(id),
        }
        self.mru = Some(id);
    }

    fn unlink(&mut self, id: SlotId) -> bool {
        let (newer, older) = match self.nodes.get(id) {
            Some(link) => (link.newer, link.older),
            None => return false,
        };
        match newer {
            Some(n) => {
                if let Some(link) = self.nodes.get_mut(n) {
                    link.older = older;
                }
            },
            None => self.mru = older,
        }
        match older {
            Some(o) => {
                if let Some(link) = self.nodes.get_mut(o) {
                    link.newer = newer;
                }
            },
            None => self.lru = newer,
        }
        true
    }

    /// Panics if the `newer`/`older` links disagree or the walk length
    /// differs from `len()`.
    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        let mut expected_newer = None;
        let mut walked = 0;
        let mut cursor = self.mru;
        while let Some(id) = cursor {
            let link = self.nodes.get(id).expect("linked slot is vacant");
            assert_eq!(link.newer, expected_newer, "newer link mismatch");
            expected_newer = Some(id);
            cursor = link.older;
            walked += 1;
            assert!(walked <= self.len(), "cycle in recency list");
        }
        assert_eq!(walked, self.len());
        assert_eq!(self.lru, expected_newer);
    }
}

/// Borrowing iterator over a [`RecencyList`], MRU first.
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    newest: Option<SlotId>,
    oldest: Option<SlotId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let link = self.list.nodes.get(self.newest?)?;
        self.newest = link.older;
        self.remaining -= 1;
        Some(&link.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let link = self.list.nodes.get(self.oldest?)?;
        self.oldest = link.newer;
        self.remaining -= 1;
        Some(&link.value)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(values: &[u32]) -> (RecencyList<u32>, Vec<SlotId>) {
        let mut list = RecencyList::with_capacity(values.len());
        let ids = values.iter().map(|&v| list.push_mru(v)).collect();
        (list, ids)
    }

    fn mru_first(list: &RecencyList<u32>) -> Vec<u32> {
        list.iter().copied().collect()
    }

    #[test]
    fn push_mru_orders_newest_first() {
        let (list, _) = list_of(&[1, 2, 3]);
        assert_eq!(mru_first(&list), [3, 2, 1]);
        assert_eq!(list.lru(), Some(&1));
        assert_eq!(list.len(), 3);
        list.debug_validate_invariants();
    }

    #[test]
    fn pop_lru_drains_oldest_first() {
        let (mut list, _) = list_of(&[1, 2, 3]);
        assert_eq!(list.pop_lru(), Some(1));
        assert_eq!(list.pop_lru(), Some(2));
        assert_eq!(list.lru(), Some(&3));
        assert_eq!(list.pop_lru(), Some(3));
        assert_eq!(list.pop_lru(), None);
        assert!(list.is_empty());
        assert_eq!(list.lru(), None);
        list.debug_validate_invariants();
    }

    #[test]
    fn touch_moves_to_mru_end() {
        let (mut list, ids) = list_of(&[1, 2, 3]);
        assert!(list.touch(ids[0]));
        assert_eq!(mru_first(&list), [1, 3, 2]);
        assert!(list.touch(ids[2]));
        assert_eq!(mru_first(&list), [3, 1, 2]);
        // Already MRU.
        assert!(list.touch(ids[2]));
        assert_eq!(mru_first(&list), [3, 1, 2]);
        assert_eq!(list.pop_lru(), Some(2));
        list.debug_validate_invariants();
    }

    #[test]
    fn touch_or_remove_dead_handle_is_noop() {
        let (mut list, ids) = list_of(&[1, 2]);
        assert_eq!(list.remove(ids[0]), Some(1));
        assert!(!list.touch(ids[0]));
        assert_eq!(list.remove(ids[0]), None);
        assert_eq!(mru_first(&list), [2]);
        list.debug_validate_invariants();
    }

    #[test]
    fn remove_from_middle_and_ends() {
        let (mut list, ids) = list_of(&[1, 2, 3, 4, 5]);
        assert_eq!(list.remove(ids[2]), Some(3));
        assert_eq!(list.remove(ids[4]), Some(5));
        assert_eq!(list.remove(ids[0]), Some(1));
        assert_eq!(mru_first(&list), [4, 2]);
        assert_eq!(list.lru(), Some(&2));
        list.debug_validate_invariants();

        let id = list.push_mru(6);
        assert_eq!(list.get(id), Some(&6));
        assert_eq!(mru_first(&list), [6, 4, 2]);
        list.debug_validate_invariants();
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let (list, _) = list_of(&[1, 2, 3, 4]);
        let mut iter = list.iter();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some(&4));
        assert_eq!(iter.next_back(), Some(&1));
        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next_back(), Some(&2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);

        let lru_first: Vec<_> = list.iter().rev().copied().collect();
        assert_eq!(lru_first, [1, 2, 3, 4]);
    }

    #[test]
    fn ids_follow_links_mru_first() {
        let (mut list, ids) = list_of(&[1, 2, 3]);
        list.touch(ids[1]);
        let walked: Vec<_> = list.ids().collect();
        assert_eq!(walked, [ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn get_mut_and_clear() {
        let (mut list, ids) = list_of(&[1, 2]);
        if let Some(value) = list.get_mut(ids[0]) {
            *value = 10;
        }
        assert_eq!(list.lru(), Some(&10));

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.iter().next(), None);
        assert_eq!(list.ids().next(), None);
        list.debug_validate_invariants();
    }
}
