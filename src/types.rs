//! Shared primitive IDs and registry constants.

/// Six-digit member identifier derived from the member's name.
pub type MemberId = u32;
/// Position of a slot inside the record store.
pub type SlotIdx = usize;

/// Identifiers are reduced into `0..ID_SPACE`.
pub const ID_SPACE: u64 = 1_000_000;
/// Empty slots allocated on top of the persisted record count at startup.
pub const DEFAULT_INITIAL_BUFFER: usize = 10;
/// Slots added each time the store runs out of room.
pub const DEFAULT_GROWTH_INCREMENT: usize = 10;
/// Column names written as the first row of a delimited member file.
pub const FIELD_NAMES: [&str; 4] = ["ID", "FNAME", "LNAME", "EMAIL"];
