//! Checkpoint Store
//!
//! Remembers, per history source, the last changeset whose commit was fully written.
//! The exporter resumes strictly after that mark.

pub mod persistence;

pub use persistence::SledCheckpointStore;

use crate::error::StorageError;
use crate::types::ChangesetId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Export progress of one source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Last fully exported changeset
    pub last_mark: ChangesetId,
    /// Unix seconds of the save
    pub exported_at: i64,
    /// Changesets exported since the last fresh export
    pub changesets_exported: u64,
}

/// Checkpoint Store interface
pub trait CheckpointStore {
    fn load(&self, source: &str) -> Result<Option<Checkpoint>, StorageError>;
    fn save(&self, source: &str, checkpoint: &Checkpoint) -> Result<(), StorageError>;
    /// Returns whether a checkpoint existed
    fn clear(&self, source: &str) -> Result<bool, StorageError>;
    fn list(&self) -> Result<Vec<(String, Checkpoint)>, StorageError>;
}

/// Checkpoints held in memory
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    entries: RwLock<BTreeMap<String, Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self, source: &str) -> Result<Option<Checkpoint>, StorageError> {
        Ok(self.entries.read().get(source).copied())
    }

    fn save(&self, source: &str, checkpoint: &Checkpoint) -> Result<(), StorageError> {
        self.entries.write().insert(source.to_string(), *checkpoint);
        Ok(())
    }

    fn clear(&self, source: &str) -> Result<bool, StorageError> {
        Ok(self.entries.write().remove(source).is_some())
    }

    fn list(&self) -> Result<Vec<(String, Checkpoint)>, StorageError> {
        Ok(self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect())
    }
}
