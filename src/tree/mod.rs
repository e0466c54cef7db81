//! Naming Tree
//!
//! Maps stable asset identifiers to their current `(name, parent)` placement and
//! resolves hierarchical paths by walking parent links up to a root. Entries are
//! never removed: a deleted asset stays in the tree under the removed container so
//! its last live path can still be computed.

pub mod node;

pub use node::AssetNode;

use crate::error::ExportError;
use crate::types::{
    AssetId, SETTINGS_ROOT, SETTINGS_ROOT_NAME, SETTINGS_SUFFIX, TRASH_ROOT, TRASH_ROOT_NAME,
};
use std::collections::HashMap;

/// Upper bound on parent hops before a chain is treated as cyclic
pub const MAX_PATH_DEPTH: usize = 256;

/// Path separator used in emitted paths
pub const PATH_SEPARATOR: char = '/';

/// Identifier -> placement store
#[derive(Debug, Clone)]
pub struct NamingTree {
    nodes: HashMap<AssetId, AssetNode>,
}

impl Default for NamingTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingTree {
    /// Create a tree holding only the settings and removed roots
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            SETTINGS_ROOT,
            AssetNode::new(SETTINGS_ROOT, SETTINGS_ROOT_NAME, None),
        );
        nodes.insert(TRASH_ROOT, AssetNode::new(TRASH_ROOT, TRASH_ROOT_NAME, None));
        NamingTree { nodes }
    }

    /// Non-failing existence check
    pub fn lookup(&self, id: &AssetId) -> Option<&AssetNode> {
        self.nodes.get(id)
    }

    /// Number of known nodes, including the two roots
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when some asset currently lives directly inside `id`.
    ///
    /// Removed assets hang off the removed root, so every child found is live.
    pub fn has_live_children(&self, id: &AssetId) -> bool {
        self.nodes.values().any(|node| node.parent == Some(*id))
    }

    /// Resolve the root-to-leaf path of `id`.
    ///
    /// Fails with `UnresolvedIdentifier` naming the first unknown link, and with
    /// `PathCycle` when the chain exceeds `MAX_PATH_DEPTH` hops.
    pub fn resolve_path(&self, id: &AssetId) -> Result<String, ExportError> {
        let mut names: Vec<&str> = Vec::new();
        let mut current = *id;
        loop {
            if names.len() >= MAX_PATH_DEPTH {
                return Err(ExportError::PathCycle(*id));
            }
            let node = self
                .nodes
                .get(&current)
                .ok_or(ExportError::UnresolvedIdentifier(current))?;
            names.push(node.name.as_str());
            match node.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }

        let mut path = String::new();
        for name in names.iter().rev().filter(|n| !n.is_empty()) {
            if !path.is_empty() {
                path.push(PATH_SEPARATOR);
            }
            path.push_str(name);
        }
        Ok(path)
    }

    /// Create or partially update a node and return its freshly resolved path.
    ///
    /// Known ids only take the fields that are supplied. Unknown ids need a name;
    /// a new parentless node whose name ends in the settings suffix is placed under
    /// the settings root.
    pub fn upsert(
        &mut self,
        id: AssetId,
        parent: Option<AssetId>,
        name: Option<&str>,
    ) -> Result<String, ExportError> {
        self.place(id, parent, name)?;
        self.resolve_path(&id)
    }

    /// `upsert` without resolving the path.
    ///
    /// Used while bootstrapping, where a child may be seen before its parent.
    pub fn place(
        &mut self,
        id: AssetId,
        parent: Option<AssetId>,
        name: Option<&str>,
    ) -> Result<(), ExportError> {
        if let Some(parent) = parent {
            self.check_acyclic(id, parent)?;
        }

        match self.nodes.get_mut(&id) {
            Some(node) => {
                if let Some(parent) = parent {
                    node.parent = Some(parent);
                }
                if let Some(name) = name {
                    node.name = name.to_string();
                }
            }
            None => {
                let name = name.ok_or(ExportError::UnresolvedIdentifier(id))?;
                let parent = match parent {
                    Some(parent) => Some(parent),
                    None if name.ends_with(SETTINGS_SUFFIX) => Some(SETTINGS_ROOT),
                    None => None,
                };
                self.nodes.insert(id, AssetNode::new(id, name, parent));
            }
        }
        Ok(())
    }

    /// Reject a placement of `id` under `parent` that would close a loop.
    ///
    /// Unknown ancestors end the walk: bootstrap may see a child before its parent.
    fn check_acyclic(&self, id: AssetId, parent: AssetId) -> Result<(), ExportError> {
        let mut current = Some(parent);
        let mut hops = 0;
        while let Some(ancestor) = current {
            if ancestor == id {
                return Err(ExportError::PathCycle(id));
            }
            hops += 1;
            if hops > MAX_PATH_DEPTH {
                return Err(ExportError::PathCycle(id));
            }
            current = self.nodes.get(&ancestor).and_then(|n| n.parent);
        }
        Ok(())
    }
}
