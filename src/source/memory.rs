//! In-memory history source.

use crate::error::ExportError;
use crate::source::history::{ChangesetInfo, History};
use crate::source::{AssetVersionRecord, Changeset, HistorySource, Payload};
use crate::types::{ChangesetId, PayloadHandle};
use std::collections::HashMap;
use std::io::Cursor;

/// History and payload bytes held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    history: History,
    payloads: HashMap<PayloadHandle, Vec<u8>>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_history(History::new(name))
    }

    pub fn from_history(history: History) -> Self {
        Self {
            history,
            payloads: HashMap::new(),
        }
    }

    pub fn with_baseline(mut self, baseline: ChangesetId) -> Self {
        self.history.baseline = baseline;
        self
    }

    pub fn add_changeset(&mut self, info: ChangesetInfo) {
        self.history.changesets.push(info);
    }

    /// Append a version; call in version-serial order
    pub fn add_version(&mut self, record: AssetVersionRecord) {
        self.history.versions.push(record);
    }

    pub fn add_payload(&mut self, handle: PayloadHandle, bytes: impl Into<Vec<u8>>) {
        self.payloads.insert(handle, bytes.into());
    }
}

impl HistorySource for MemorySource {
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
        let bytes = self
            .payloads
            .get(&handle)
            .ok_or_else(|| ExportError::PayloadReadFailure {
                handle,
                reason: "no such payload".to_string(),
            })?;
        Ok(Payload {
            len: bytes.len() as u64,
            reader: Box::new(Cursor::new(bytes.clone())),
        })
    }
}
