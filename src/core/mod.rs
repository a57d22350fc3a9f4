//! In-memory member store, indices, and registry facade.

/// Name-to-identifier derivation.
pub mod identity;
/// Identity index and secondary index helpers.
pub mod indices;
/// Registry combining slot store and indices.
pub mod registry;
/// Slot-reusing, fixed-step-growing record store.
pub mod slots;
