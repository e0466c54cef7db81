//! Error types for the exporter.
//!
//! Every variant is fatal for a run: the exporter flushes what it has written and
//! stops, leaving the checkpoint at the last fully emitted changeset.

use crate::types::{AssetId, PayloadHandle};
use thiserror::Error;

/// Checkpoint storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Failed to encode or decode checkpoint: {0}")]
    Codec(String),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Codec(err.to_string())
    }
}

/// Exporter error
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unresolved asset identifier: {0}")]
    UnresolvedIdentifier(AssetId),

    #[error("Asset {id} is already removed (last path {path:?}) and cannot be touched again")]
    InvalidTrashOperation { id: AssetId, path: String },

    #[error("Parent chain of asset {0} does not terminate at a root")]
    PathCycle(AssetId),

    #[error("History source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Failed to read payload {handle}: {reason}")]
    PayloadReadFailure {
        handle: PayloadHandle,
        reason: String,
    },

    #[error("Checkpoint storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to write commit stream: {0}")]
    Output(#[from] std::io::Error),

    #[error("Importer failed: {0}")]
    ImporterFailed(String),
}

impl From<config::ConfigError> for ExportError {
    fn from(err: config::ConfigError) -> Self {
        ExportError::ConfigError(err.to_string())
    }
}
