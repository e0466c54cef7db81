//! Serializable history dump shared by the in-memory and manifest sources.

use crate::source::{AssetVersionRecord, Author, Changeset};
use crate::types::ChangesetId;
use serde::{Deserialize, Serialize};

/// Changeset metadata without its versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesetInfo {
    pub id: ChangesetId,
    pub author: Author,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub comment: String,
}

/// Complete history of one asset server project.
///
/// `versions` must be listed in version-serial order; changeset membership is
/// taken from each record's `changeset` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub name: String,
    #[serde(default)]
    pub baseline: ChangesetId,
    #[serde(default)]
    pub changesets: Vec<ChangesetInfo>,
    #[serde(default)]
    pub versions: Vec<AssetVersionRecord>,
}

impl History {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn bootstrap_versions(&self, up_to: ChangesetId) -> Vec<AssetVersionRecord> {
        self.versions
            .iter()
            .filter(|v| v.changeset <= up_to)
            .cloned()
            .collect()
    }

    pub fn changesets_after(&self, after: ChangesetId) -> Vec<Changeset> {
        let mut infos: Vec<&ChangesetInfo> =
            self.changesets.iter().filter(|c| c.id > after).collect();
        infos.sort_by_key(|c| c.id);

        infos
            .into_iter()
            .map(|info| Changeset {
                id: info.id,
                author: info.author.clone(),
                timestamp: info.timestamp,
                comment: info.comment.clone(),
                versions: self
                    .versions
                    .iter()
                    .filter(|v| v.changeset == info.id)
                    .cloned()
                    .collect(),
            })
            .collect()
    }
}
