use std::fs;
use std::path::{Path, PathBuf};

use asset_export::config::ExportConfig;
use asset_export::tooling::cli::{CliContext, Commands};
use tempfile::TempDir;

const MANIFEST: &str = r#"{
    "name": "demo",
    "baseline": 0,
    "changesets": [
        { "id": 1, "author": { "name": "Dev", "email": "dev@example.com" },
          "timestamp": 1300000001, "comment": "add foo" },
        { "id": 2, "author": { "name": "Dev" },
          "timestamp": 1300000002, "comment": "move foo" }
    ],
    "versions": [
        { "id": "111111111111111111111111111111a1", "name": "foo.txt",
          "kind": "file", "changeset": 1,
          "streams": [ { "tag": "asset", "handle": 1 } ] },
        { "id": "111111111111111111111111111111d1", "name": "assets",
          "kind": "folder", "changeset": 1 },
        { "id": "111111111111111111111111111111a1", "name": "bar.txt",
          "parent": "111111111111111111111111111111d1",
          "kind": "file", "changeset": 2,
          "streams": [ { "tag": "asset", "handle": 1 } ] }
    ]
}"#;

struct Fixture {
    _temp: TempDir,
    root: PathBuf,
    manifest: PathBuf,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    let manifest = root.join("history.json");
    fs::write(&manifest, MANIFEST).unwrap();
    fs::create_dir_all(root.join("payloads")).unwrap();
    fs::write(root.join("payloads").join("1"), "hello").unwrap();
    Fixture {
        _temp: temp,
        root,
        manifest,
    }
}

fn context(root: &Path, manifest: Option<&Path>) -> CliContext {
    let mut config = ExportConfig::default();
    config.export.checkpoint_path = Some(root.join("checkpoints"));
    config.source.manifest = manifest.map(Path::to_path_buf);
    CliContext::with_config(config).unwrap()
}

fn export_to(output: &Path) -> Commands {
    Commands::Export {
        manifest: None,
        source_name: None,
        branch: None,
        full: false,
        no_data: false,
        since: None,
        output: Some(output.to_path_buf()),
        git_dir: None,
    }
}

#[test]
fn export_writes_stream_file_and_reports_summary() {
    let fx = fixture();
    let cli = context(&fx.root, Some(fx.manifest.as_path()));
    let out = fx.root.join("stream.fi");

    let summary = cli.execute(&export_to(&out)).unwrap();
    assert!(summary.contains("Exported 2 changesets"));
    assert!(summary.contains("'demo'"));

    let stream = fs::read_to_string(&out).unwrap();
    assert!(stream.contains("author Dev <Dev@Dev> 1300000002 +0000\n"));
    assert!(stream.contains("M 644 inline \"assets.meta\"\n"));
    assert!(stream.contains("R \"foo.txt\" \"assets/bar.txt\"\n"));
    assert!(stream.ends_with("progress Export complete: 2 changesets\n"));
}

#[test]
fn second_export_is_up_to_date() {
    let fx = fixture();
    let cli = context(&fx.root, Some(fx.manifest.as_path()));
    cli.execute(&export_to(&fx.root.join("first.fi"))).unwrap();

    let summary = cli.execute(&export_to(&fx.root.join("second.fi"))).unwrap();
    assert!(summary.contains("Exported 0 changesets"));
    assert!(summary.contains("Up to date at changeset 2"));
    assert_eq!(
        fs::read_to_string(fx.root.join("second.fi")).unwrap(),
        "progress Export complete: 0 changesets\n"
    );
}

#[test]
fn export_without_manifest_is_config_error() {
    let fx = fixture();
    let cli = context(&fx.root, None);
    let err = cli
        .execute(&export_to(&fx.root.join("stream.fi")))
        .unwrap_err();
    assert!(err.to_string().contains("manifest"));
}

#[test]
fn status_json_contract_has_required_fields() {
    let fx = fixture();
    let cli = context(&fx.root, Some(fx.manifest.as_path()));
    cli.execute(&export_to(&fx.root.join("stream.fi"))).unwrap();

    let output = cli
        .execute(&Commands::Status {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.get("total").and_then(|v| v.as_u64()), Some(1));
    assert!(parsed.get("checkpoint_path").and_then(|v| v.as_str()).is_some());

    let entry = &parsed["sources"][0];
    assert_eq!(entry["source"], "demo");
    assert_eq!(entry["last_mark"], 2);
    assert_eq!(entry["changesets_exported"], 2);
    assert!(entry["exported_at"].as_str().is_some());
}

#[test]
fn status_rejects_unknown_format() {
    let fx = fixture();
    let cli = context(&fx.root, None);
    assert!(cli
        .execute(&Commands::Status {
            format: "xml".to_string()
        })
        .is_err());
}

#[test]
fn reset_clears_checkpoint_for_configured_source() {
    let fx = fixture();
    let cli = context(&fx.root, Some(fx.manifest.as_path()));
    cli.execute(&export_to(&fx.root.join("stream.fi"))).unwrap();

    let output = cli
        .execute(&Commands::Reset {
            source: None,
            yes: true,
        })
        .unwrap();
    assert_eq!(output, "Checkpoint for 'demo' cleared.");
    assert!(cli.checkpoints().load("demo").unwrap().is_none());

    let output = cli
        .execute(&Commands::Reset {
            source: Some("demo".to_string()),
            yes: true,
        })
        .unwrap();
    assert_eq!(output, "No checkpoint stored for 'demo'.");

    let summary = cli.execute(&export_to(&fx.root.join("again.fi"))).unwrap();
    assert!(summary.contains("Exported 2 changesets"));
}

#[test]
fn stdout_logging_conflicts_with_stdout_stream() {
    let fx = fixture();
    let mut cli = context(&fx.root, Some(fx.manifest.as_path()));
    let to_stdout = Commands::Export {
        manifest: None,
        source_name: None,
        branch: None,
        full: false,
        no_data: false,
        since: None,
        output: None,
        git_dir: None,
    };
    cli.check_logging(&to_stdout).unwrap();

    cli.config_mut().logging.output = "stdout".to_string();
    assert!(cli.check_logging(&to_stdout).is_err());
    assert!(cli.check_logging(&export_to(&fx.root.join("s.fi"))).is_ok());
}

#[test]
fn failing_importer_leaves_checkpoint_untouched() {
    let fx = fixture();
    let cli = context(&fx.root, Some(fx.manifest.as_path()));
    let into_missing_repo = Commands::Export {
        manifest: None,
        source_name: None,
        branch: None,
        full: false,
        no_data: false,
        since: None,
        output: None,
        git_dir: Some(fx.root.join("missing.git")),
    };

    assert!(cli.execute(&into_missing_repo).is_err());
    assert!(cli.checkpoints().load("demo").unwrap().is_none());
}
