//! Sled-backed checkpoint persistence.

use crate::error::StorageError;
use crate::store::{Checkpoint, CheckpointStore};
use std::path::Path;

const CHECKPOINT_TREE: &str = "checkpoints";

/// Checkpoints stored in a sled tree, keyed by source name, bincode values
pub struct SledCheckpointStore {
    tree: sled::Tree,
}

impl SledCheckpointStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path).map_err(|e| {
            StorageError::Database(format!(
                "Failed to open sled database {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_db(&db)
    }

    pub fn from_db(db: &sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            tree: db.open_tree(CHECKPOINT_TREE)?,
        })
    }
}

impl CheckpointStore for SledCheckpointStore {
    fn load(&self, source: &str) -> Result<Option<Checkpoint>, StorageError> {
        match self.tree.get(source.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, source: &str, checkpoint: &Checkpoint) -> Result<(), StorageError> {
        let bytes = bincode::serialize(checkpoint)?;
        self.tree.insert(source.as_bytes(), bytes)?;
        // must be durable before the next changeset is emitted
        self.tree.flush()?;
        tracing::debug!(
            source,
            last_mark = checkpoint.last_mark,
            "Checkpoint saved"
        );
        Ok(())
    }

    fn clear(&self, source: &str) -> Result<bool, StorageError> {
        let existed = self.tree.remove(source.as_bytes())?.is_some();
        self.tree.flush()?;
        Ok(existed)
    }

    fn list(&self) -> Result<Vec<(String, Checkpoint)>, StorageError> {
        let mut entries = Vec::new();
        for item in self.tree.iter() {
            let (key, value) = item?;
            let name = String::from_utf8_lossy(&key).into_owned();
            entries.push((name, bincode::deserialize(&value)?));
        }
        Ok(entries)
    }
}
