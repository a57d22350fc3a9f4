//! Gym membership registry with slot-reusing in-memory storage and
//! delimited-file persistence.
//!
//! # Examples
//!
//! In-memory usage with [`core::registry::MemberRegistry`]:
//! ```
//! use memberlog::{
//!     core::registry::{MemberRegistry, StoreError},
//!     member::MemberDraft,
//! };
//!
//! let mut registry = MemberRegistry::new();
//! let id = registry
//!     .insert(MemberDraft::new("Jane", "Doe", "j@x.com"))
//!     .expect("insert");
//! assert_eq!(registry.find_by_name("JANE", "doe").expect("find").id, id);
//!
//! let dupe = registry.insert(MemberDraft::new("Jane", "Doe", "other@x.com"));
//! assert_eq!(dupe, Err(StoreError::DuplicateMember { id }));
//! ```
//!
//! Loading and saving through a member file:
//! ```no_run
//! use memberlog::{
//!     config::RegistryConfig,
//!     persist::{delimited::DelimitedFile, load_registry, save_registry},
//! };
//!
//! let mut file = DelimitedFile::new("members.txt", ',');
//! let registry = load_registry(&mut file, &RegistryConfig::default()).expect("load");
//! save_registry(&mut file, &registry).expect("save");
//! ```
#![deny(missing_docs)]

/// Registry and storage configuration.
pub mod config;
/// Core in-memory store and index helpers.
pub mod core;
/// Member domain records.
pub mod member;
/// Persistence abstraction with delimited-file and SQLite implementations.
pub mod persist;
/// Interactive menu session.
pub mod shell;
/// Shared primitive types and constants.
pub mod types;
