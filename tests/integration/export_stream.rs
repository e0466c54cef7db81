use asset_export::emit::{DataMode, ExportOptions};
use asset_export::error::ExportError;
use asset_export::store::{Checkpoint, CheckpointStore, MemoryCheckpointStore};

use crate::support::{changeset, dir, export, file, file_ops, id, lifecycle_source, trashed};

#[test]
fn lifecycle_stream_has_expected_operations() {
    let source = lifecycle_source();
    let checkpoints = MemoryCheckpointStore::new();
    let (result, stream) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    let summary = result.unwrap();

    assert_eq!(summary.changesets, 3);
    assert_eq!(summary.last_mark, Some(3));
    assert_eq!(summary.resumed_from, None);
    assert_eq!(
        file_ops(&stream),
        vec![
            "M 644 inline \"foo.txt\"",
            "M 644 inline \"foo.txt.meta\"",
            "M 644 inline \"assets.meta\"",
            "R \"foo.txt\" \"assets/bar.txt\"",
            "R \"foo.txt.meta\" \"assets/bar.txt.meta\"",
            "M 644 inline \"assets/bar.txt\"",
            "M 644 inline \"assets/bar.txt.meta\"",
            "D \"assets/bar.txt\"",
            "D \"assets/bar.txt.meta\"",
        ]
    );
}

#[test]
fn first_commit_resets_and_later_commits_chain_by_mark() {
    let source = lifecycle_source();
    let checkpoints = MemoryCheckpointStore::new();
    let (result, stream) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    result.unwrap();

    assert!(stream.starts_with(
        "commit refs/heads/master\n\
         mark :1\n\
         author Dev <dev@example.com> 1300000001 +0000\n\
         committer Dev <dev@example.com> 1300000001 +0000\n\
         data 7\nadd foo\n\
         deleteall\n\
         M 644 inline \"foo.txt\"\n\
         data 5\nhello\n"
    ));
    assert_eq!(stream.matches("deleteall").count(), 1);
    assert!(stream.contains("mark :2\n"));
    assert!(stream.contains("\nfrom :1\n"));
    assert!(stream.contains("\nfrom :2\n"));
    assert!(stream.contains("progress Changeset 1 (2 files): add foo\n"));
    assert!(stream.ends_with("progress Export complete: 3 changesets\n"));
}

#[test]
fn every_commit_ends_with_blank_line_before_progress() {
    let source = lifecycle_source();
    let checkpoints = MemoryCheckpointStore::new();
    let (_, stream) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    assert_eq!(stream.matches("\n\nprogress Changeset").count(), 3);
}

#[test]
fn checkpoint_records_last_changeset() {
    let source = lifecycle_source();
    let checkpoints = MemoryCheckpointStore::new();
    export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    )
    .0
    .unwrap();

    let cp = checkpoints.load("proj").unwrap().unwrap();
    assert_eq!(cp.last_mark, 3);
    assert_eq!(cp.changesets_exported, 3);
}

#[test]
fn rerun_without_new_changesets_emits_no_commits() {
    let source = lifecycle_source();
    let checkpoints = MemoryCheckpointStore::new();
    export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    )
    .0
    .unwrap();
    let before = checkpoints.load("proj").unwrap();

    let (result, stream) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    let summary = result.unwrap();
    assert_eq!(summary.changesets, 0);
    assert_eq!(summary.resumed_from, Some(3));
    assert_eq!(stream, "progress Export complete: 0 changesets\n");
    assert_eq!(checkpoints.load("proj").unwrap(), before);
}

#[test]
fn resumed_run_follows_branch_tip_and_uses_seeded_tree() {
    let mut source = lifecycle_source();
    let checkpoints = MemoryCheckpointStore::new();
    export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    )
    .0
    .unwrap();

    source.add_changeset(changeset(4, "add logo"));
    source.add_version(file(3, "logo.png", Some(id(2)), 4, (20, 21)));
    source.add_payload(20, vec![0x89, 0x50, 0x4e, 0x47]);
    source.add_payload(21, "guid: logo\n");

    let (result, stream) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    let summary = result.unwrap();
    assert_eq!(summary.changesets, 1);
    assert!(!stream.contains("deleteall"));
    assert!(stream.contains("mark :4\n"));
    assert!(stream.contains("\nfrom refs/heads/master^0\n"));
    assert_eq!(
        file_ops(&stream),
        vec![
            "M 644 inline \"assets/logo.png\"",
            "M 644 inline \"assets/logo.png.meta\"",
        ]
    );
    assert!(stream.contains("data 4\n\u{FFFD}PNG\n"));

    let cp = checkpoints.load("proj").unwrap().unwrap();
    assert_eq!(cp.last_mark, 4);
    assert_eq!(cp.changesets_exported, 4);
}

#[test]
fn touching_removed_asset_aborts_without_advancing_checkpoint() {
    let mut source = lifecycle_source();
    source.add_changeset(changeset(4, "resurrect"));
    source.add_version(file(1, "bar.txt", Some(id(2)), 4, (10, 11)));

    let checkpoints = MemoryCheckpointStore::new();
    let (result, _) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    assert!(matches!(
        result,
        Err(ExportError::InvalidTrashOperation { id: bad, .. }) if bad == id(1)
    ));
    assert_eq!(checkpoints.load("proj").unwrap().unwrap().last_mark, 3);
}

#[test]
fn deleted_container_follows_its_deleted_contents() {
    let mut source = lifecycle_source();
    source.add_changeset(changeset(4, "add art"));
    source.add_version(dir(4, "art", None, 4));
    source.add_version(file(5, "a.png", Some(id(4)), 4, (30, 31)));
    source.add_changeset(changeset(5, "drop art"));
    source.add_version(trashed(dir(4, "art", None, 5), 5));
    source.add_version(trashed(file(5, "a.png", Some(id(4)), 5, (30, 31)), 5));
    source.add_payload(30, "png");
    source.add_payload(31, "guid: a\n");

    let checkpoints = MemoryCheckpointStore::new();
    checkpoints
        .save(
            "proj",
            &Checkpoint {
                last_mark: 3,
                exported_at: 0,
                changesets_exported: 3,
            },
        )
        .unwrap();

    let (result, stream) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    result.unwrap();
    let ops = file_ops(&stream);
    assert_eq!(
        &ops[ops.len() - 3..],
        &[
            "D \"art/a.png\"",
            "D \"art/a.png.meta\"",
            "D \"art.meta\"",
        ]
    );
}

#[test]
fn renaming_empty_folder_moves_only_its_sidecar() {
    let mut source = lifecycle_source();
    source.add_changeset(changeset(4, "add art"));
    source.add_version(dir(4, "Art", None, 4));
    source.add_changeset(changeset(5, "rename art"));
    source.add_version(dir(4, "Textures", None, 5));

    let checkpoints = MemoryCheckpointStore::new();
    let (result, stream) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    result.unwrap();
    let ops = file_ops(&stream);
    assert_eq!(ops.last(), Some(&"R \"Art.meta\" \"Textures.meta\""));
    assert!(!stream.contains("R \"Art\" \"Textures\""));
}

#[test]
fn renaming_populated_folder_moves_folder_and_sidecar() {
    let mut source = lifecycle_source();
    source.add_changeset(changeset(4, "add art"));
    source.add_version(dir(4, "Art", None, 4));
    source.add_version(file(5, "a.png", Some(id(4)), 4, (30, 31)));
    source.add_changeset(changeset(5, "rename art"));
    source.add_version(dir(4, "Textures", None, 5));
    source.add_payload(30, "png");
    source.add_payload(31, "guid: a\n");

    let checkpoints = MemoryCheckpointStore::new();
    let (result, stream) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    result.unwrap();
    let ops = file_ops(&stream);
    assert_eq!(
        &ops[ops.len() - 2..],
        &["R \"Art.meta\" \"Textures.meta\"", "R \"Art\" \"Textures\""]
    );
}

#[test]
fn baseline_seeds_tree_and_exports_later_changesets() {
    let source = lifecycle_source().with_baseline(1);
    let checkpoints = MemoryCheckpointStore::new();
    let (result, stream) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    assert_eq!(result.unwrap().changesets, 2);
    assert!(!stream.contains("mark :1\n"));
    assert!(stream.contains("mark :2\n"));
    assert!(stream.contains("deleteall\nR \"foo.txt\" \"assets/bar.txt\"\n"));
}

#[test]
fn since_overrides_baseline_on_fresh_export_only() {
    let source = lifecycle_source();
    let checkpoints = MemoryCheckpointStore::new();
    let options = ExportOptions {
        since: Some(2),
        ..ExportOptions::default()
    };
    let (result, stream) = export(&source, &checkpoints, options.clone(), DataMode::Inline);
    assert_eq!(result.unwrap().changesets, 1);
    assert!(stream.contains("deleteall\nD \"assets/bar.txt\"\n"));

    let (result, _) = export(
        &source,
        &checkpoints,
        ExportOptions {
            since: Some(0),
            ..ExportOptions::default()
        },
        DataMode::Inline,
    );
    assert_eq!(result.unwrap().changesets, 0);
}

#[test]
fn full_export_ignores_stored_checkpoint() {
    let source = lifecycle_source();
    let checkpoints = MemoryCheckpointStore::new();
    export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    )
    .0
    .unwrap();

    let (result, stream) = export(
        &source,
        &checkpoints,
        ExportOptions {
            full: true,
            ..ExportOptions::default()
        },
        DataMode::Inline,
    );
    assert_eq!(result.unwrap().changesets, 3);
    assert!(stream.contains("deleteall"));
    assert_eq!(
        checkpoints.load("proj").unwrap().unwrap().changesets_exported,
        3
    );
}

#[test]
fn stub_mode_replaces_payload_bytes() {
    let source = lifecycle_source();
    let checkpoints = MemoryCheckpointStore::new();
    let (result, stream) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Stub,
    );
    result.unwrap();
    assert!(stream.contains("M 644 inline \"foo.txt\"\ndata 13\nStreamData10\n\n"));
    assert!(!stream.contains("hello"));
}

#[test]
fn missing_payload_fails_the_changeset() {
    let mut source = lifecycle_source();
    source.add_changeset(changeset(4, "broken"));
    source.add_version(file(6, "gone.bin", None, 4, (99, 98)));

    let checkpoints = MemoryCheckpointStore::new();
    let (result, _) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    assert!(matches!(
        result,
        Err(ExportError::PayloadReadFailure { handle: 99, .. })
    ));
    assert_eq!(checkpoints.load("proj").unwrap().unwrap().last_mark, 3);
}

#[test]
fn settings_assets_land_under_project_settings() {
    let mut source = lifecycle_source();
    source.add_changeset(changeset(4, "settings"));
    source.add_version(file(7, "TagManager.asset", None, 4, (40, 41)));
    source.add_payload(40, "tags");
    source.add_payload(41, "guid: tags\n");

    let checkpoints = MemoryCheckpointStore::new();
    let (result, stream) = export(
        &source,
        &checkpoints,
        ExportOptions::default(),
        DataMode::Inline,
    );
    result.unwrap();
    assert!(stream.contains("M 644 inline \"ProjectSettings/TagManager.asset\"\n"));
}
