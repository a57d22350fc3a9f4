use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::RegistryConfig,
    core::{
        identity::derive_member_id,
        indices::{IdentityIndex, VecIndex, push_to_vec_index, remove_from_vec_index},
        slots::SlotStore,
    },
    member::{MemberDraft, MemberRecord, normalize_email, normalize_name},
    types::{MemberId, SlotIdx},
};

/// Key a failed lookup was made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Lookup by identifier.
    ById(MemberId),
    /// Lookup by first and last name.
    ByName {
        /// Given name searched for.
        first: String,
        /// Family name searched for.
        last: String,
    },
    /// Lookup by email address.
    ByEmail(String),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ById(id) => write!(f, "with ID {id:06}"),
            Self::ByName { first, last } => write!(f, "named {first} {last}"),
            Self::ByEmail(email) => write!(f, "with email {email}"),
        }
    }
}

/// Recoverable registry failures. None of them change registry state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A member with the same name is already registered.
    #[error("member {id:06} is already registered")]
    DuplicateMember {
        /// Identifier shared by both names.
        id: MemberId,
    },
    /// A different name already hashes to the same identifier.
    #[error("identifier {id:06} is already taken by {existing}")]
    IdentifierCollision {
        /// Contested identifier.
        id: MemberId,
        /// Full name of the member holding the identifier.
        existing: String,
    },
    /// Nothing matched the lookup.
    #[error("no member {0}")]
    NotFound(Lookup),
    /// A field holds a line break or the storage delimiter.
    #[error("field {field:?} contains a line break or the delimiter")]
    InvalidField {
        /// Offending field text.
        field: String,
    },
    /// A batch of loaded records repeated an identifier.
    #[error("identifier {id:06} appears more than once")]
    DuplicateIdentifier {
        /// Repeated identifier.
        id: MemberId,
    },
}

/// Point-in-time copy of registry contents in ascending identifier order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Slot capacity at export time.
    pub capacity: usize,
    /// Members, ascending by identifier.
    pub records: Vec<MemberRecord>,
}

/// Authoritative member registry: slot store plus identity and email indices.
#[derive(Debug, Clone)]
pub struct MemberRegistry {
    store: SlotStore,
    index: IdentityIndex,
    by_email: VecIndex<String>,
    field_delimiter: Option<char>,
}

impl Default for MemberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberRegistry {
    /// Empty registry with the default buffer and growth step.
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    /// Empty registry with `config.initial_buffer` free slots.
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            store: SlotStore::with_capacity(config.initial_buffer, config.growth_increment),
            index: IdentityIndex::new(),
            by_email: VecIndex::new(),
            field_delimiter: None,
        }
    }

    /// Rejects names and emails containing `delimiter` from now on.
    #[must_use]
    pub fn with_field_delimiter(mut self, delimiter: char) -> Self {
        self.field_delimiter = Some(delimiter);
        self
    }

    /// Builds a registry from persisted records.
    ///
    /// Capacity starts at `records.len() + config.initial_buffer`, records
    /// occupy the leading slots in the order given. Fails without building
    /// anything when an identifier repeats.
    pub fn from_records(
        records: Vec<MemberRecord>,
        config: &RegistryConfig,
    ) -> Result<Self, StoreError> {
        let mut registry = Self {
            store: SlotStore::with_capacity(
                records.len() + config.initial_buffer,
                config.growth_increment,
            ),
            index: IdentityIndex::new(),
            by_email: VecIndex::new(),
            field_delimiter: None,
        };

        for rec in records {
            if registry.index.contains(rec.id) {
                return Err(StoreError::DuplicateIdentifier { id: rec.id });
            }
            registry.place(rec);
        }

        Ok(registry)
    }

    /// Copies out every member in ascending identifier order.
    pub fn export_snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            capacity: self.capacity(),
            records: self.iter().cloned().collect(),
        }
    }

    /// Registers a new member under the identifier derived from its name.
    pub fn insert(&mut self, draft: MemberDraft) -> Result<MemberId, StoreError> {
        for field in [&draft.first_name, &draft.last_name, &draft.email] {
            self.check_field(field)?;
        }

        let id = draft.member_id();
        if let Some(existing) = self.get(id) {
            let err = if existing.normalized_name()
                == normalize_name(&draft.first_name, &draft.last_name)
            {
                StoreError::DuplicateMember { id }
            } else {
                StoreError::IdentifierCollision {
                    id,
                    existing: existing.full_name(),
                }
            };
            warn!(id, %err, "rejected member insert");
            return Err(err);
        }

        let slot = self.place(draft.into_record());
        debug!(id, slot, capacity = self.capacity(), "inserted member");
        Ok(id)
    }

    /// Removes a member, returning the record that occupied its slot.
    pub fn remove(&mut self, id: MemberId) -> Result<MemberRecord, StoreError> {
        let not_found = || StoreError::NotFound(Lookup::ById(id));
        let slot = self.index.slot_of(id).ok_or_else(not_found)?;
        let rec = self.store.clear(slot).ok_or_else(not_found)?;
        self.index.remove(id);
        remove_from_vec_index(&mut self.by_email, &normalize_email(&rec.email), id);
        debug!(id, slot, "removed member");
        Ok(rec)
    }

    /// Replaces a member's email address.
    pub fn update_email(&mut self, id: MemberId, email: &str) -> Result<&MemberRecord, StoreError> {
        self.check_field(email)?;
        let slot = self
            .index
            .slot_of(id)
            .ok_or(StoreError::NotFound(Lookup::ById(id)))?;
        let rec = self
            .store
            .get_mut(slot)
            .ok_or(StoreError::NotFound(Lookup::ById(id)))?;

        let old_key = normalize_email(&rec.email);
        rec.email = email.to_string();
        remove_from_vec_index(&mut self.by_email, &old_key, id);
        push_to_vec_index(&mut self.by_email, normalize_email(email), id);
        debug!(id, "updated member email");

        self.lookup(id)
    }

    /// Member with identifier `id`, if any.
    pub fn get(&self, id: MemberId) -> Option<&MemberRecord> {
        self.index.slot_of(id).and_then(|slot| self.store.get(slot))
    }

    /// Like [`Self::get`] but reports a miss as [`StoreError::NotFound`].
    pub fn lookup(&self, id: MemberId) -> Result<&MemberRecord, StoreError> {
        self.get(id).ok_or(StoreError::NotFound(Lookup::ById(id)))
    }

    /// Member registered under `first last`, matched case-insensitively.
    ///
    /// A record that only shares the derived identifier with a different
    /// name does not match.
    pub fn find_by_name(&self, first: &str, last: &str) -> Result<&MemberRecord, StoreError> {
        let wanted = normalize_name(first, last);
        self.get(derive_member_id(first, last))
            .filter(|rec| rec.normalized_name() == wanted)
            .ok_or_else(|| {
                StoreError::NotFound(Lookup::ByName {
                    first: first.to_string(),
                    last: last.to_string(),
                })
            })
    }

    /// Members whose email matches `email` ignoring ASCII case, by identifier.
    pub fn find_by_email(&self, email: &str) -> Result<Vec<&MemberRecord>, StoreError> {
        let found: Vec<&MemberRecord> = self
            .by_email
            .get(&normalize_email(email))
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.get(*id))
            .collect();
        if found.is_empty() {
            return Err(StoreError::NotFound(Lookup::ByEmail(email.to_string())));
        }
        Ok(found)
    }

    /// Members in ascending identifier order. Each call starts a fresh walk.
    pub fn iter(&self) -> impl Iterator<Item = &MemberRecord> + '_ {
        self.index
            .iter()
            .filter_map(|(_, slot)| self.store.get(slot))
    }

    /// Indexed identifiers in ascending order.
    pub fn ordered_ids(&self) -> Vec<MemberId> {
        self.index.ids().collect()
    }

    /// `(slot, id)` for every occupied slot, in slot order.
    pub fn occupied_slots(&self) -> Vec<(SlotIdx, MemberId)> {
        self.store.occupied().map(|(slot, rec)| (slot, rec.id)).collect()
    }

    /// Slot position of member `id`.
    pub fn slot_of(&self, id: MemberId) -> Option<SlotIdx> {
        self.index.slot_of(id)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when no member is registered.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total slots, occupied or free.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Number of growth steps taken so far.
    pub fn grow_events(&self) -> u64 {
        self.store.grow_events()
    }

    fn check_field(&self, field: &str) -> Result<(), StoreError> {
        let breaks_row = field.contains(['\n', '\r'])
            || self.field_delimiter.is_some_and(|d| field.contains(d));
        if breaks_row {
            let err = StoreError::InvalidField {
                field: field.to_string(),
            };
            warn!(%err, "rejected member field");
            return Err(err);
        }
        Ok(())
    }

    fn place(&mut self, rec: MemberRecord) -> SlotIdx {
        let id = rec.id;
        let email_key = normalize_email(&rec.email);
        let slot = self.store.insert(rec);
        self.index.insert(id, slot);
        push_to_vec_index(&mut self.by_email, email_key, id);
        slot
    }
}
