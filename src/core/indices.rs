use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::types::{MemberId, SlotIdx};

/// Multi-valued secondary index.
pub type VecIndex<K> = HashMap<K, Vec<MemberId>>;

/// Ordered identifier → slot position map.
///
/// Holds positions rather than references so that store growth never
/// invalidates an entry.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    slots: BTreeMap<MemberId, SlotIdx>,
}

impl IdentityIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `id` is indexed.
    pub fn contains(&self, id: MemberId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Slot position recorded for `id`.
    pub fn slot_of(&self, id: MemberId) -> Option<SlotIdx> {
        self.slots.get(&id).copied()
    }

    /// Returns the previous slot if `id` was already indexed.
    pub fn insert(&mut self, id: MemberId, slot: SlotIdx) -> Option<SlotIdx> {
        self.slots.insert(id, slot)
    }

    /// Drops the entry for `id`, returning its slot.
    pub fn remove(&mut self, id: MemberId) -> Option<SlotIdx> {
        self.slots.remove(&id)
    }

    /// Number of indexed identifiers.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Entries in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (MemberId, SlotIdx)> + '_ {
        self.slots.iter().map(|(id, slot)| (*id, *slot))
    }

    /// Identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.slots.keys().copied()
    }
}

pub(crate) fn push_to_vec_index(index: &mut VecIndex<String>, key: String, id: MemberId) {
    let ids = index.entry(key).or_default();
    if let Err(pos) = ids.binary_search(&id) {
        ids.insert(pos, id);
    }
}

pub(crate) fn remove_from_vec_index(index: &mut VecIndex<String>, key: &str, id: MemberId) {
    let Some(ids) = index.get_mut(key) else {
        return;
    };
    if let Some(pos) = ids.iter().position(|x| *x == id) {
        ids.remove(pos);
    }
    if ids.is_empty() {
        index.remove(key);
    }
}
