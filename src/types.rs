//! Core types for the asset history exporter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ChangesetId: monotonically increasing changeset serial, reused as the commit mark
pub type ChangesetId = u64;

/// PayloadHandle: opaque handle to one stored byte stream
pub type PayloadHandle = u64;

/// Leaf-name suffix of singleton project settings assets
pub const SETTINGS_SUFFIX: &str = ".asset";

/// Name of the settings root container
pub const SETTINGS_ROOT_NAME: &str = "ProjectSettings";

/// Name of the removed-asset container
pub const TRASH_ROOT_NAME: &str = "Trash";

/// Container for loose top-level settings files
pub const SETTINGS_ROOT: AssetId = AssetId([0x00; 16]);

/// Terminal container for deleted assets
pub const TRASH_ROOT: AssetId = AssetId([0xff; 16]);

/// AssetId: stable 128-bit asset identifier, written as 32 lowercase hex chars
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(pub [u8; 16]);

impl AssetId {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn is_root(&self) -> bool {
        *self == SETTINGS_ROOT || *self == TRASH_ROOT
    }
}

impl FromStr for AssetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim()).map_err(|e| format!("invalid asset id {:?}: {}", s, e))?;
        let bytes: [u8; 16] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| format!("asset id {:?} is {} bytes, expected 16", s, b.len()))?;
        Ok(AssetId(bytes))
    }
}

impl TryFrom<String> for AssetId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.to_hex()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.to_hex())
    }
}
