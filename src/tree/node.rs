//! Asset node placement record

use crate::types::{AssetId, SETTINGS_ROOT, TRASH_ROOT};

/// Current placement of one asset in the naming hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNode {
    pub id: AssetId,
    pub name: String,
    pub parent: Option<AssetId>,
}

impl AssetNode {
    pub fn new(id: AssetId, name: impl Into<String>, parent: Option<AssetId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent,
        }
    }

    /// True once the asset has been moved into the removed container
    pub fn is_removed(&self) -> bool {
        self.parent == Some(TRASH_ROOT)
    }

    /// True for assets pinned under the settings root
    pub fn is_settings(&self) -> bool {
        self.parent == Some(SETTINGS_ROOT)
    }
}
