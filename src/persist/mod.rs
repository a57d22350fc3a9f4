/// Delimited text file backend.
pub mod delimited;
/// SQLite table backend.
pub mod sqlite;

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::{
    config::{Backend, RegistryConfig, StorageConfig},
    core::registry::{MemberRegistry, StoreError},
    member::MemberRecord,
};

/// Failures while loading or saving members.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// JSON failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A stored identifier is not a non-negative integer.
    #[error("line {line}: invalid member ID {value:?}")]
    InvalidIdentifier {
        /// 1-based line number in the source.
        line: usize,
        /// Raw identifier text.
        value: String,
    },
    /// A row does not have one field per column.
    #[error("line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        /// 1-based line number in the source.
        line: usize,
        /// Column count.
        expected: usize,
        /// Fields actually present.
        found: usize,
    },
    /// A field cannot be written without breaking the row format.
    #[error("field {field:?} contains the delimiter or a line break")]
    FieldNotEncodable {
        /// Offending field text.
        field: String,
    },
    /// The data file does not exist and creation was not allowed.
    #[error("member file {0:?} does not exist")]
    Missing(PathBuf),
    /// Loaded records violate a registry invariant.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for persistence calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// Supplies persisted member rows at startup.
pub trait RecordSource {
    /// Reads every stored member, in storage order.
    fn load_records(&mut self) -> PersistResult<Vec<MemberRecord>>;
}

/// Receives the full member list at shutdown.
pub trait RecordSink {
    /// Replaces stored contents with `records`, returning rows written.
    fn write_records(&mut self, records: &[MemberRecord]) -> PersistResult<usize>;

    /// Forces written data to durable storage.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
}

/// Builds a registry from everything `source` yields.
pub fn load_registry(
    source: &mut dyn RecordSource,
    config: &RegistryConfig,
) -> PersistResult<MemberRegistry> {
    let records = source.load_records()?;
    let registry = MemberRegistry::from_records(records, config)?;
    Ok(registry)
}

/// Writes every member of `registry` to `sink` in ascending identifier order.
pub fn save_registry(sink: &mut dyn RecordSink, registry: &MemberRegistry) -> PersistResult<usize> {
    let snapshot = registry.export_snapshot();
    let written = sink.write_records(&snapshot.records)?;
    sink.flush()?;
    Ok(written)
}

/// Loads the registry from the configured backend's data path.
///
/// With the delimited backend the returned registry refuses fields that
/// contain the delimiter, so a later [`save`] cannot fail on them.
pub fn load(storage: &StorageConfig, config: &RegistryConfig) -> PersistResult<MemberRegistry> {
    let path = &storage.data_path;
    let registry = match storage.backend {
        Backend::Delimited => {
            if !path.exists() {
                if !storage.create_if_missing {
                    return Err(PersistError::Missing(path.clone()));
                }
                info!(?path, "member file missing, starting empty");
                let registry = MemberRegistry::with_config(config);
                return Ok(registry.with_field_delimiter(storage.delimiter));
            }
            let mut file = delimited::DelimitedFile::new(path, storage.delimiter);
            load_registry(&mut file, config)?.with_field_delimiter(storage.delimiter)
        }
        Backend::Sqlite => {
            if !path.exists() && !storage.create_if_missing {
                return Err(PersistError::Missing(path.clone()));
            }
            let mut db = sqlite::SqliteMemberTable::open(path)?;
            load_registry(&mut db, config)?
        }
    };
    info!(?path, members = registry.len(), capacity = registry.capacity(), "loaded members");
    Ok(registry)
}

/// Rewrites the configured output path with the full registry.
pub fn save(storage: &StorageConfig, registry: &MemberRegistry) -> PersistResult<usize> {
    let path = storage.output_path();
    let written = match storage.backend {
        Backend::Delimited => {
            let mut file = delimited::DelimitedFile::new(path, storage.delimiter);
            save_registry(&mut file, registry)?
        }
        Backend::Sqlite => {
            let mut db = sqlite::SqliteMemberTable::open(path)?;
            save_registry(&mut db, registry)?
        }
    };
    info!(?path, members = written, "saved members");
    Ok(written)
}
