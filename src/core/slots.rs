use tracing::debug;

use crate::{member::MemberRecord, types::SlotIdx};

/// Array-backed member storage with slot reuse and fixed-step growth.
///
/// Slot positions never move: growth appends empty slots at the end, so a
/// position handed out by [`SlotStore::insert`] stays valid until that slot
/// is cleared.
#[derive(Debug, Clone)]
pub struct SlotStore {
    slots: Vec<Option<MemberRecord>>,
    growth_increment: usize,
    grow_events: u64,
    occupied: usize,
}

impl SlotStore {
    /// Creates a store with `capacity` empty slots.
    pub fn with_capacity(capacity: usize, growth_increment: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            growth_increment: growth_increment.max(1),
            grow_events: 0,
            occupied: 0,
        }
    }

    /// Number of slots, occupied or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// How many times the store has grown since creation.
    pub fn grow_events(&self) -> u64 {
        self.grow_events
    }

    /// First empty slot, or `None` when every slot is occupied.
    pub fn find_free_slot(&self) -> Option<SlotIdx> {
        if self.occupied == self.slots.len() {
            return None;
        }
        self.slots.iter().position(Option::is_none)
    }

    /// Writes `record` into the first free slot, growing first if full.
    pub fn insert(&mut self, record: MemberRecord) -> SlotIdx {
        let idx = match self.find_free_slot() {
            Some(idx) => idx,
            None => {
                self.grow();
                self.slots.len() - self.growth_increment
            }
        };
        self.slots[idx] = Some(record);
        self.occupied += 1;
        idx
    }

    /// Adds `growth_increment` empty slots, keeping every record in place.
    pub fn grow(&mut self) {
        let old_capacity = self.slots.len();
        let new_capacity = old_capacity + self.growth_increment;
        self.slots.resize_with(new_capacity, || None);
        self.grow_events += 1;
        debug!(old_capacity, new_capacity, "grew member store");
    }

    /// Empties slot `idx`, returning what it held.
    pub fn clear(&mut self, idx: SlotIdx) -> Option<MemberRecord> {
        let taken = self.slots.get_mut(idx)?.take();
        if taken.is_some() {
            self.occupied -= 1;
        }
        taken
    }

    /// Record at `idx`, if the slot exists and is occupied.
    pub fn get(&self, idx: SlotIdx) -> Option<&MemberRecord> {
        self.slots.get(idx)?.as_ref()
    }

    /// Mutable record at `idx`.
    pub fn get_mut(&mut self, idx: SlotIdx) -> Option<&mut MemberRecord> {
        self.slots.get_mut(idx)?.as_mut()
    }

    /// Occupied slots in position order.
    pub fn occupied(&self) -> impl Iterator<Item = (SlotIdx, &MemberRecord)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|rec| (idx, rec)))
    }
}
