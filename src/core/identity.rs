use crate::types::{ID_SPACE, MemberId};

const SEED: u64 = 5381;
const MULTIPLIER: u64 = 33;

/// Derives the six-digit identifier for a member from `first + last`.
///
/// ASCII letters are uppercased before hashing, so `"john", "smith"` and
/// `"JOHN", "SMITH"` map to the same identifier. The hash is not collision
/// resistant; the registry reports clashes between different names as
/// [`crate::core::registry::StoreError::IdentifierCollision`].
pub fn derive_member_id(first_name: &str, last_name: &str) -> MemberId {
    let hash = first_name
        .bytes()
        .chain(last_name.bytes())
        .map(|b| b.to_ascii_uppercase())
        .fold(SEED, |hash, b| {
            hash.wrapping_mul(MULTIPLIER).wrapping_add(u64::from(b))
        });
    (hash % ID_SPACE) as MemberId
}
