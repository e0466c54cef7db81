//! Stream Source Adapter
//!
//! The exporter reads history through the `HistorySource` port: a baseline
//! changeset, the asset versions needed to seed the naming tree, the changesets to
//! export, and sized readers over payload streams. Implementations live in the
//! submodules.

pub mod history;
pub mod manifest;
pub mod memory;

pub use history::{ChangesetInfo, History};
pub use manifest::ManifestSource;
pub use memory::MemorySource;

use crate::error::ExportError;
use crate::types::{AssetId, ChangesetId, PayloadHandle};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Tag of the sidecar metadata stream
pub const META_STREAM_TAG: &str = "asset.meta";

/// Path suffix of the sidecar metadata file
pub const META_SUFFIX: &str = ".meta";

/// Asset kind: regular file or container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    File,
    #[serde(alias = "folder")]
    Directory,
}

/// One named byte stream attached to an asset version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadStream {
    pub tag: String,
    pub handle: PayloadHandle,
}

impl PayloadStream {
    pub fn new(tag: impl Into<String>, handle: PayloadHandle) -> Self {
        Self {
            tag: tag.into(),
            handle,
        }
    }

    /// Target path of this stream for an asset living at `asset_path`
    pub fn target_path(&self, asset_path: &str) -> String {
        if self.tag == META_STREAM_TAG {
            format!("{}{}", asset_path, META_SUFFIX)
        } else {
            asset_path.to_string()
        }
    }
}

/// One recorded state of an asset inside a changeset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetVersionRecord {
    pub id: AssetId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<AssetId>,
    pub kind: AssetKind,
    pub changeset: ChangesetId,
    #[serde(default)]
    pub streams: Vec<PayloadStream>,
}

/// Changeset author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            name: name.into(),
            email: email.map(str::to_string),
        }
    }

    /// `Name <email>` identity; a missing email falls back to `<name@name>`
    pub fn ident(&self) -> String {
        let name = sanitize_ident(&self.name);
        match self.email.as_deref().map(sanitize_ident) {
            Some(email) if !email.is_empty() && email != "none" => {
                format!("{} <{}>", name, email)
            }
            _ => format!("{} <{}@{}>", name, name, name),
        }
    }
}

fn sanitize_ident(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '\n' | '\r'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// One atomic batch of asset versions; becomes one commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changeset {
    pub id: ChangesetId,
    pub author: Author,
    /// Commit time in unix seconds
    pub timestamp: i64,
    pub comment: String,
    pub versions: Vec<AssetVersionRecord>,
}

/// Sized byte stream
pub struct Payload {
    pub len: u64,
    pub reader: Box<dyn Read + Send>,
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payload").field("len", &self.len).finish()
    }
}

/// Historical data source port
pub trait HistorySource {
    /// Name used as the checkpoint key
    fn name(&self) -> &str;

    /// Baseline of a fresh export: versions at or before it seed the tree and
    /// changesets after it are exported
    fn initial_changeset_id(&self) -> Result<ChangesetId, ExportError>;

    /// All asset versions created at or before `up_to`, in version order
    fn bootstrap_versions(
        &self,
        up_to: ChangesetId,
    ) -> Result<Vec<AssetVersionRecord>, ExportError>;

    /// Changesets with id greater than `after`, ascending
    fn changesets_after(&self, after: ChangesetId) -> Result<Vec<Changeset>, ExportError>;

    /// Open a payload stream for reading
    fn open_payload(&self, handle: PayloadHandle) -> Result<Payload, ExportError>;
}
