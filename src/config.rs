//! Registry and storage configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    persist::{PersistError, PersistResult},
    types::{DEFAULT_GROWTH_INCREMENT, DEFAULT_INITIAL_BUFFER},
};

/// Sizing of the in-memory slot store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Free slots allocated beyond the loaded record count.
    pub initial_buffer: usize,
    /// Slots added whenever the store is full.
    pub growth_increment: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_buffer: DEFAULT_INITIAL_BUFFER,
            growth_increment: DEFAULT_GROWTH_INCREMENT,
        }
    }
}

impl RegistryConfig {
    /// Sets the startup buffer.
    #[must_use]
    pub const fn initial_buffer(mut self, slots: usize) -> Self {
        self.initial_buffer = slots;
        self
    }

    /// Sets the growth step.
    #[must_use]
    pub const fn growth_increment(mut self, slots: usize) -> Self {
        self.growth_increment = slots;
        self
    }
}

/// Storage backend holding the member list between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Header plus one delimiter-separated row per member.
    #[default]
    Delimited,
    /// SQLite database with a `members` table.
    Sqlite,
}

/// Where and how members are loaded and saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// File read at startup.
    pub data_path: PathBuf,
    /// File written at shutdown. Defaults to `data_path`.
    pub output_path: Option<PathBuf>,
    /// Field separator for the delimited backend.
    pub delimiter: char,
    /// Backend selection.
    pub backend: Backend,
    /// Treat a missing data file as an empty registry.
    pub create_if_missing: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("members.txt"),
            output_path: None,
            delimiter: ',',
            backend: Backend::Delimited,
            create_if_missing: true,
        }
    }
}

impl StorageConfig {
    /// Path members are saved to.
    pub fn output_path(&self) -> &Path {
        self.output_path.as_deref().unwrap_or(&self.data_path)
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Slot store sizing.
    pub registry: RegistryConfig,
    /// Persistence settings.
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Reads a JSON config file. Absent keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> PersistResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Parses JSON config text.
    pub fn from_json_str(text: &str) -> PersistResult<Self> {
        serde_json::from_str(text).map_err(PersistError::from)
    }
}
