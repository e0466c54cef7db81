//! Version Orderer
//!
//! Deletions are recorded as moves into the removed container, and a changeset may
//! remove a container together with its contents. The importer must see every
//! descendant deleted before the container itself, so each removed record is moved
//! behind any later record of the same changeset that currently lives inside it.

use crate::source::AssetVersionRecord;
use crate::tree::NamingTree;
use crate::types::TRASH_ROOT;

/// Reorder a changeset's versions in place so removed containers follow their
/// removed descendants. Unrelated records keep their relative order.
pub fn order_versions(versions: &mut Vec<AssetVersionRecord>, tree: &NamingTree) {
    let mut i = 0;
    while i < versions.len() {
        if versions[i].parent == Some(TRASH_ROOT) {
            let container = versions[i].id;
            let child = versions
                .iter()
                .enumerate()
                .skip(i + 1)
                .find(|(_, v)| tree.lookup(&v.id).and_then(|n| n.parent) == Some(container))
                .map(|(j, _)| j);

            if let Some(j) = child {
                let record = versions.remove(i);
                versions.insert(j, record);
                // position i now holds the next unvisited record
                continue;
            }
        }
        i += 1;
    }
}
