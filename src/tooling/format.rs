//! Format export summaries and checkpoint status as text.

use crate::emit::ExportSummary;
use crate::sink::OutputSink;
use crate::store::Checkpoint;
use crate::types::ChangesetId;
use chrono::{TimeZone, Utc};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// One stored checkpoint in `status` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub source: String,
    pub last_mark: ChangesetId,
    pub changesets_exported: u64,
    /// RFC 3339; the raw seconds when the timestamp is out of range
    pub exported_at: String,
}

impl StatusEntry {
    pub fn new(source: String, checkpoint: &Checkpoint) -> Self {
        let exported_at = Utc
            .timestamp_opt(checkpoint.exported_at, 0)
            .single()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| checkpoint.exported_at.to_string());
        Self {
            source,
            last_mark: checkpoint.last_mark,
            changesets_exported: checkpoint.changesets_exported,
            exported_at,
        }
    }
}

/// `status` output
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutput {
    pub checkpoint_path: String,
    pub sources: Vec<StatusEntry>,
    pub total: usize,
}

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_status_text(data: &StatusOutput) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Export Checkpoints")));
    out.push_str(&format!("  Checkpoint store: {}\n", data.checkpoint_path));
    if data.sources.is_empty() {
        out.push_str("  No exports recorded yet.\n");
        return out;
    }
    out.push('\n');

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Source", "Last changeset", "Exported", "At"]);
    for entry in &data.sources {
        table.add_row(vec![
            entry.source.clone(),
            entry.last_mark.to_string(),
            entry.changesets_exported.to_string(),
            entry.exported_at.clone(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_export_summary(summary: &ExportSummary, sink: &OutputSink) -> String {
    let mut out = format!(
        "Exported {} changesets ({} operations) from '{}' to {}",
        summary.changesets, summary.operations, summary.source, sink
    );
    match (summary.resumed_from, summary.last_mark) {
        (Some(from), Some(last)) => {
            out.push_str(&format!("\n  Resumed after changeset {}, now at {}", from, last))
        }
        (Some(from), None) => {
            out.push_str(&format!("\n  Up to date at changeset {}", from))
        }
        (None, Some(last)) => out.push_str(&format!("\n  Last changeset: {}", last)),
        (None, None) => {}
    }
    out
}
