//! Diff Engine
//!
//! Classifies each asset version against the naming tree and turns it into zero or
//! more file-level operations, advancing the tree as a side effect.

use crate::error::ExportError;
use crate::source::{AssetKind, AssetVersionRecord, META_SUFFIX};
use crate::tree::{AssetNode, NamingTree};
use crate::types::{AssetId, PayloadHandle, TRASH_ROOT};
use std::collections::HashSet;
use tracing::debug;

/// One file-level change inside a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Modify {
        path: String,
        handle: PayloadHandle,
    },
    Delete {
        path: String,
    },
    Rename {
        from: String,
        to: String,
    },
    CreateDirectoryPlaceholder {
        path: String,
        contents: Vec<u8>,
    },
}

impl Operation {
    /// Short code used in logs
    pub fn code(&self) -> &'static str {
        match self {
            Operation::Modify { .. } => "M",
            Operation::Delete { .. } => "D",
            Operation::Rename { .. } => "R",
            Operation::CreateDirectoryPlaceholder { .. } => "M(dir)",
        }
    }
}

/// Synthesized sidecar for a container
pub fn directory_placeholder(id: &AssetId) -> Vec<u8> {
    format!(
        "fileFormatVersion: 2\nguid: {}\nfolderAsset: yes\nDefaultImporter:\n  userData: \n",
        id.to_hex()
    )
    .into_bytes()
}

/// Turns asset versions into operations against an owned naming tree
#[derive(Debug, Default)]
pub struct DiffEngine {
    tree: NamingTree,
    /// Containers whose sidecar placeholder exists in the target
    materialized: HashSet<AssetId>,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::with_tree(NamingTree::new())
    }

    pub fn with_tree(tree: NamingTree) -> Self {
        Self {
            tree,
            materialized: HashSet::new(),
        }
    }

    pub fn tree(&self) -> &NamingTree {
        &self.tree
    }

    /// Seed the tree with historical placements; emits nothing.
    ///
    /// Live containers seen here are taken to have their placeholder in the target.
    pub fn bootstrap(&mut self, versions: &[AssetVersionRecord]) -> Result<(), ExportError> {
        for version in versions {
            self.tree
                .place(version.id, version.parent, Some(version.name.as_str()))?;
            if version.kind == AssetKind::Directory {
                if version.parent == Some(TRASH_ROOT) {
                    self.materialized.remove(&version.id);
                } else {
                    self.materialized.insert(version.id);
                }
            }
        }
        Ok(())
    }

    /// Diff one asset version into operations.
    pub fn diff(&mut self, record: &AssetVersionRecord) -> Result<Vec<Operation>, ExportError> {
        let to_trash = record.parent == Some(TRASH_ROOT);
        let mut ops = Vec::new();
        let mut renamed = false;

        let path = match self.tree.lookup(&record.id).cloned() {
            None => self
                .tree
                .upsert(record.id, record.parent, Some(record.name.as_str()))?,
            Some(node) if node.is_removed() => {
                return Err(ExportError::InvalidTrashOperation {
                    id: record.id,
                    path: self.tree.resolve_path(&record.id)?,
                });
            }
            Some(node) if node.is_settings() => self.tree.resolve_path(&record.id)?,
            Some(node) if placement_changed(&node, record) => {
                let old_path = self.tree.resolve_path(&record.id)?;
                if to_trash {
                    for path in self.stream_paths(record, &old_path) {
                        ops.push(Operation::Delete { path });
                    }
                    self.materialized.remove(&record.id);
                    self.tree
                        .place(record.id, record.parent, Some(record.name.as_str()))?;
                    debug!(asset = %record.id, path = %old_path, ops = ops.len(), "Asset removed");
                    return Ok(ops);
                }

                let new_path = self
                    .tree
                    .upsert(record.id, record.parent, Some(record.name.as_str()))?;
                if new_path != old_path {
                    for (from, to) in self
                        .stream_paths(record, &old_path)
                        .into_iter()
                        .zip(self.stream_paths(record, &new_path))
                    {
                        ops.push(Operation::Rename { from, to });
                    }
                    // an empty directory has no path of its own in the target
                    if record.kind == AssetKind::Directory
                        && self.tree.has_live_children(&record.id)
                    {
                        ops.push(Operation::Rename {
                            from: old_path.clone(),
                            to: new_path.clone(),
                        });
                    }
                    renamed = true;
                    debug!(asset = %record.id, from = %old_path, to = %new_path, "Asset moved");
                }
                new_path
            }
            Some(_) => self.tree.resolve_path(&record.id)?,
        };

        if to_trash {
            return Ok(ops);
        }

        match record.kind {
            AssetKind::Directory => {
                if !renamed {
                    ops.push(Operation::CreateDirectoryPlaceholder {
                        path: format!("{}{}", path, META_SUFFIX),
                        contents: directory_placeholder(&record.id),
                    });
                    self.materialized.insert(record.id);
                }
            }
            AssetKind::File => {
                for stream in &record.streams {
                    ops.push(Operation::Modify {
                        path: stream.target_path(&path),
                        handle: stream.handle,
                    });
                }
            }
        }

        debug!(asset = %record.id, path = %path, ops = ops.len(), "Asset diffed");
        Ok(ops)
    }

    /// Materialized entries of an asset at `base`.
    ///
    /// A container owns its sidecar once a placeholder was written for it; regular
    /// assets own one entry per distinct stream path.
    fn stream_paths(&self, record: &AssetVersionRecord, base: &str) -> Vec<String> {
        match record.kind {
            AssetKind::Directory if self.materialized.contains(&record.id) => {
                vec![format!("{}{}", base, META_SUFFIX)]
            }
            AssetKind::Directory => Vec::new(),
            AssetKind::File => {
                let mut paths: Vec<String> = Vec::new();
                for stream in &record.streams {
                    let path = stream.target_path(base);
                    if !paths.contains(&path) {
                        paths.push(path);
                    }
                }
                paths
            }
        }
    }
}

/// A supplied parent or a different name counts as a new placement
fn placement_changed(node: &AssetNode, record: &AssetVersionRecord) -> bool {
    let parent_changed = record.parent.is_some() && record.parent != node.parent;
    parent_changed || node.name != record.name
}
