//! Manifest-backed history source.
//!
//! Reads a history dump (`.json`, `.yaml`/`.yml` or `.toml`) whose payload bytes are
//! stored one file per handle under `payload_dir`, relative to the manifest.

use crate::error::ExportError;
use crate::source::history::History;
use crate::source::{AssetVersionRecord, Changeset, HistorySource, Payload};
use crate::types::{ChangesetId, PayloadHandle};
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_payload_dir() -> PathBuf {
    PathBuf::from("payloads")
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(flatten)]
    history: History,
    #[serde(default = "default_payload_dir")]
    payload_dir: PathBuf,
}

/// History source backed by a manifest file and a payload directory
#[derive(Debug)]
pub struct ManifestSource {
    history: History,
    payload_dir: PathBuf,
}

impl ManifestSource {
    /// Load a manifest; any failure to read or parse it is `SourceUnavailable`
    pub fn open(path: &Path) -> Result<Self, ExportError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExportError::SourceUnavailable(format!(
                "Failed to read manifest {}: {}",
                path.display(),
                e
            ))
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("json")
            .to_ascii_lowercase();
        let parsed: ManifestFile = match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            "toml" => toml::from_str(&content).map_err(|e| e.to_string()),
            _ => serde_json::from_str(&content).map_err(|e| e.to_string()),
        }
        .map_err(|e| {
            ExportError::SourceUnavailable(format!(
                "Failed to parse manifest {}: {}",
                path.display(),
                e
            ))
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let payload_dir = base.join(parsed.payload_dir);
        tracing::debug!(
            manifest = %path.display(),
            versions = parsed.history.versions.len(),
            changesets = parsed.history.changesets.len(),
            "Loaded history manifest"
        );

        Ok(Self {
            history: parsed.history,
            payload_dir,
        })
    }

    /// Replace the checkpoint key recorded in the manifest
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.history.name = name.into();
        self
    }

    pub fn payload_path(&self, handle: PayloadHandle) -> PathBuf {
        self.payload_dir.join(handle.to_string())
    }
}

impl HistorySource for ManifestSource {
    fn name(&self) -> &str {
        &self.history.name
    }

    fn initial_changeset_id(&self) -> Result<ChangesetId, ExportError> {
        Ok(self.history.baseline)
    }

    fn bootstrap_versions(
        &self,
        up_to: ChangesetId,
    ) -> Result<Vec<AssetVersionRecord>, ExportError> {
        Ok(self.history.bootstrap_versions(up_to))
    }

    fn changesets_after(&self, after: ChangesetId) -> Result<Vec<Changeset>, ExportError> {
        Ok(self.history.changesets_after(after))
    }

    fn open_payload(&self, handle: PayloadHandle) -> Result<Payload, ExportError> {
        let path = self.payload_path(handle);
        let failure = |e: std::io::Error| ExportError::PayloadReadFailure {
            handle,
            reason: format!("{}: {}", path.display(), e),
        };
        let file = std::fs::File::open(&path).map_err(failure)?;
        let len = file.metadata().map_err(failure)?.len();
        Ok(Payload {
            len,
            reader: Box::new(file),
        })
    }
}
