//! Member domain record and draft types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{core::identity::derive_member_id, types::MemberId};

/// Fully materialized member record held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Identifier derived from the member's full name.
    pub id: MemberId,
    /// Given name as entered.
    pub first_name: String,
    /// Family name as entered.
    pub last_name: String,
    /// Contact email address.
    pub email: String,
}

impl MemberRecord {
    /// Returns `"first last"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Uppercased `first + last`, the exact text the identifier is hashed from.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.first_name, &self.last_name)
    }
}

impl fmt::Display for MemberRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:06}\t{} {}\t{}",
            self.id, self.first_name, self.last_name, self.email
        )
    }
}

/// Insert payload used to create a new [`MemberRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDraft {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email address.
    pub email: String,
}

impl MemberDraft {
    /// Builds a draft from borrowed parts.
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
        }
    }

    /// Identifier this draft will receive on insert.
    pub fn member_id(&self) -> MemberId {
        derive_member_id(&self.first_name, &self.last_name)
    }

    /// Materializes the record under its derived identifier.
    pub fn into_record(self) -> MemberRecord {
        MemberRecord {
            id: self.member_id(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }
}

pub(crate) fn normalize_name(first_name: &str, last_name: &str) -> String {
    let mut name = String::with_capacity(first_name.len() + last_name.len());
    name.push_str(first_name);
    name.push_str(last_name);
    name.make_ascii_uppercase();
    name
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
