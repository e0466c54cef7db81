//! Shared fixtures: a small asset history and stream helpers.

use asset_export::emit::{DataMode, ExportOptions, ExportSummary, Exporter, FastImportWriter};
use asset_export::error::ExportError;
use asset_export::source::{
    AssetKind, AssetVersionRecord, Author, ChangesetInfo, MemorySource, PayloadStream,
    META_STREAM_TAG,
};
use asset_export::store::CheckpointStore;
use asset_export::types::{AssetId, ChangesetId, PayloadHandle, TRASH_ROOT};

pub fn id(n: u8) -> AssetId {
    let mut bytes = [0x11; 16];
    bytes[15] = n;
    AssetId(bytes)
}

pub fn changeset(id: ChangesetId, comment: &str) -> ChangesetInfo {
    ChangesetInfo {
        id,
        author: Author::new("Dev", Some("dev@example.com")),
        timestamp: 1_300_000_000 + id as i64,
        comment: comment.to_string(),
    }
}

pub fn file(
    n: u8,
    name: &str,
    parent: Option<AssetId>,
    changeset: ChangesetId,
    handles: (PayloadHandle, PayloadHandle),
) -> AssetVersionRecord {
    AssetVersionRecord {
        id: id(n),
        name: name.to_string(),
        parent,
        kind: AssetKind::File,
        changeset,
        streams: vec![
            PayloadStream::new("asset", handles.0),
            PayloadStream::new(META_STREAM_TAG, handles.1),
        ],
    }
}

pub fn dir(n: u8, name: &str, parent: Option<AssetId>, changeset: ChangesetId) -> AssetVersionRecord {
    AssetVersionRecord {
        id: id(n),
        name: name.to_string(),
        parent,
        kind: AssetKind::Directory,
        changeset,
        streams: vec![],
    }
}

pub fn trashed(mut record: AssetVersionRecord, changeset: ChangesetId) -> AssetVersionRecord {
    record.parent = Some(TRASH_ROOT);
    record.changeset = changeset;
    record
}

/// Changesets 1..=3 create, move and delete `foo.txt`:
///
/// 1. `foo.txt` and `assets/` appear
/// 2. `foo.txt` moves to `assets/bar.txt`
/// 3. `bar.txt` goes to the trash
pub fn lifecycle_source() -> MemorySource {
    let mut source = MemorySource::new("proj");
    source.add_changeset(changeset(1, "add foo"));
    source.add_changeset(changeset(2, "move foo"));
    source.add_changeset(changeset(3, "delete bar"));

    source.add_version(file(1, "foo.txt", None, 1, (10, 11)));
    source.add_version(dir(2, "assets", None, 1));
    source.add_version(file(1, "bar.txt", Some(id(2)), 2, (10, 11)));
    source.add_version(trashed(file(1, "bar.txt", Some(id(2)), 3, (10, 11)), 3));

    source.add_payload(10, "hello");
    source.add_payload(11, "guid: foo\n");
    source
}

pub fn export(
    source: &MemorySource,
    checkpoints: &dyn CheckpointStore,
    options: ExportOptions,
    mode: DataMode,
) -> (Result<ExportSummary, ExportError>, String) {
    let mut writer = FastImportWriter::new(Vec::new(), mode);
    let result = Exporter::new(source, checkpoints, options).run(&mut writer);
    let stream = String::from_utf8_lossy(&writer.into_inner()).into_owned();
    (result, stream)
}

/// Lines of the stream starting with one of the file-operation codes
pub fn file_ops(stream: &str) -> Vec<&str> {
    stream
        .lines()
        .filter(|l| l.starts_with("M 644") || l.starts_with("D ") || l.starts_with("R "))
        .collect()
}
