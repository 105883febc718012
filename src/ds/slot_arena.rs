//! Slot-based node storage with stable handles.
//!
//! Nodes of the recency list live here. A `SlotId` stays valid until its slot
//! is released. Vacant slots are chained through the slots themselves, so a
//! release followed by an insert (the eviction pattern) reuses the same slot
//! without touching any side allocation.

/// Stable handle to a slot in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    /// Returns the raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(T),
    /// Vacant; links to the next vacant slot.
    Vacant(Option<usize>),
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    next_vacant: Option<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            next_vacant: None,
            len: 0,
        }
    }

    /// Stores `value`, reusing the most recently released slot if any.
    pub fn insert(&mut self, value: T) -> SlotId {
        self.len += 1;
        match self.next_vacant {
            Some(idx) => {
                let slot = std::mem::replace(&mut self.slots[idx], Slot::Occupied(value));
                if let Slot::Vacant(next) = slot {
                    self.next_vacant = next;
                }
                SlotId(idx)
            },
            None => {
                self.slots.push(Slot::Occupied(value));
                SlotId(self.slots.len() - 1)
            },
        }
    }

    /// Releases the slot and returns its value; `None` if already vacant.
    pub fn release(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        if matches!(slot, Slot::Vacant(_)) {
            return None;
        }
        let taken = std::mem::replace(slot, Slot::Vacant(self.next_vacant));
        self.next_vacant = Some(id.0);
        self.len -= 1;
        match taken {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        match self.slots.get(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        match self.slots.get_mut(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Drops every value. Outstanding `SlotId`s become dangling.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.next_vacant = None;
        self.len = 0;
    }
}
