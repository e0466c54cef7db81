//! Commit Emitter
//!
//! Drives one run: seeds the naming tree up to the resume point, then turns every
//! later changeset into one commit, saving the checkpoint after each commit is
//! fully written. With deferred checkpoints the final checkpoint is handed back in
//! the summary instead, for the caller to save once the consumer accepted the stream.

use crate::diff::DiffEngine;
use crate::emit::writer::{CommitHeader, FastImportWriter, Linkage};
use crate::error::ExportError;
use crate::order::order_versions;
use crate::source::{Changeset, HistorySource};
use crate::store::{Checkpoint, CheckpointStore};
use crate::types::ChangesetId;
use serde::Serialize;
use std::io::Write;
use tracing::{debug, info, warn};

/// Longest comment excerpt shown on a progress line
pub const PROGRESS_COMMENT_LIMIT: usize = 100;

/// Run options
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub branch: String,
    /// `+HHMM` / `-HHMM`
    pub timezone: String,
    /// Ignore the stored checkpoint and start a fresh export
    pub full: bool,
    /// Baseline for a fresh export, overriding the source's
    pub since: Option<ChangesetId>,
    pub checkpoints: CheckpointTiming,
}

/// When the exporter writes checkpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckpointTiming {
    /// After every changeset the writer flushed
    #[default]
    EachChangeset,
    /// Never; the last checkpoint is returned in `ExportSummary::pending_checkpoint`
    Deferred,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            branch: "master".to_string(),
            timezone: "+0000".to_string(),
            full: false,
            since: None,
            checkpoints: CheckpointTiming::EachChangeset,
        }
    }
}

/// Where the run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Bootstrapping,
    Idle,
    InChangeset(ChangesetId),
    Done,
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub source: String,
    /// Checkpoint the run resumed from; `None` for a fresh export
    pub resumed_from: Option<ChangesetId>,
    pub changesets: usize,
    pub operations: usize,
    pub last_mark: Option<ChangesetId>,
    /// Checkpoint still to be saved by the caller under `CheckpointTiming::Deferred`
    pub pending_checkpoint: Option<Checkpoint>,
}

/// One export run over a source
pub struct Exporter<'a> {
    source: &'a dyn HistorySource,
    checkpoints: &'a dyn CheckpointStore,
    options: ExportOptions,
    engine: DiffEngine,
    phase: ExportPhase,
}

impl<'a> Exporter<'a> {
    pub fn new(
        source: &'a dyn HistorySource,
        checkpoints: &'a dyn CheckpointStore,
        options: ExportOptions,
    ) -> Self {
        Self {
            source,
            checkpoints,
            options,
            engine: DiffEngine::new(),
            phase: ExportPhase::Idle,
        }
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    pub fn engine(&self) -> &DiffEngine {
        &self.engine
    }

    /// Run to completion. Buffered output is flushed on success and on failure.
    pub fn run<W: Write>(
        &mut self,
        writer: &mut FastImportWriter<W>,
    ) -> Result<ExportSummary, ExportError> {
        let result = self.run_inner(writer);
        let flushed = writer.flush();
        match result {
            Ok(summary) => {
                flushed?;
                Ok(summary)
            }
            Err(e) => {
                if let Err(flush_err) = flushed {
                    warn!("Failed to flush commit stream after error: {}", flush_err);
                }
                Err(e)
            }
        }
    }

    fn run_inner<W: Write>(
        &mut self,
        writer: &mut FastImportWriter<W>,
    ) -> Result<ExportSummary, ExportError> {
        let name = self.source.name().to_string();
        let prior = if self.options.full {
            None
        } else {
            self.checkpoints.load(&name)?
        };

        let resume_point = match (&prior, self.options.since) {
            (Some(cp), since) => {
                if since.is_some() {
                    warn!(
                        source = %name,
                        last_mark = cp.last_mark,
                        "Ignoring --since: resuming from stored checkpoint"
                    );
                }
                cp.last_mark
            }
            (None, Some(since)) => since,
            (None, None) => self.source.initial_changeset_id()?,
        };
        info!(
            source = %name,
            resume_point,
            fresh = prior.is_none(),
            "Starting export"
        );

        self.phase = ExportPhase::Bootstrapping;
        let versions = self.source.bootstrap_versions(resume_point)?;
        self.engine.bootstrap(&versions)?;
        info!(
            versions = versions.len(),
            nodes = self.engine.tree().len(),
            "Naming tree bootstrapped"
        );
        self.phase = ExportPhase::Idle;

        let changesets = self.source.changesets_after(resume_point)?;
        let mut exported_total = prior.map(|cp| cp.changesets_exported).unwrap_or(0);
        let mut previous: Option<ChangesetId> = None;
        let mut operations = 0;
        let mut count = 0;
        let mut pending = None;

        for changeset in changesets {
            let linkage = match previous {
                Some(mark) => Linkage::Mark(mark),
                None if prior.is_none() => Linkage::Reset,
                None => Linkage::BranchTip,
            };
            let mark = changeset.id;
            operations += self.emit_changeset(writer, changeset, linkage)?;
            writer.flush()?;

            exported_total += 1;
            let checkpoint = Checkpoint {
                last_mark: mark,
                exported_at: chrono::Utc::now().timestamp(),
                changesets_exported: exported_total,
            };
            match self.options.checkpoints {
                CheckpointTiming::EachChangeset => self.checkpoints.save(&name, &checkpoint)?,
                CheckpointTiming::Deferred => pending = Some(checkpoint),
            }
            previous = Some(mark);
            count += 1;
        }

        writer.progress(&format!("Export complete: {} changesets", count))?;
        self.phase = ExportPhase::Done;
        info!(
            source = %name,
            changesets = count,
            operations,
            "Export finished"
        );

        Ok(ExportSummary {
            source: name,
            resumed_from: prior.map(|cp| cp.last_mark),
            changesets: count,
            operations,
            last_mark: previous,
            pending_checkpoint: pending,
        })
    }

    /// Write one commit; returns the number of operations emitted
    fn emit_changeset<W: Write>(
        &mut self,
        writer: &mut FastImportWriter<W>,
        changeset: Changeset,
        linkage: Linkage,
    ) -> Result<usize, ExportError> {
        self.phase = ExportPhase::InChangeset(changeset.id);
        let Changeset {
            id,
            author,
            timestamp,
            comment,
            mut versions,
        } = changeset;

        order_versions(&mut versions, self.engine.tree());

        let ident = author.ident();
        writer.begin_commit(
            &CommitHeader {
                branch: &self.options.branch,
                mark: id,
                ident: &ident,
                timestamp,
                timezone: &self.options.timezone,
                message: &comment,
            },
            linkage,
        )?;

        let mut operations = 0;
        for version in &versions {
            let ops = self.engine.diff(version)?;
            for op in &ops {
                debug!(changeset = id, op = op.code(), asset = %version.id, "Writing operation");
                writer.write_operation(op, self.source)?;
            }
            operations += ops.len();
        }
        writer.end_commit()?;

        writer.progress(&format!(
            "Changeset {} ({} files): {}",
            id,
            versions.len(),
            summarize_comment(&comment)
        ))?;
        info!(changeset = id, versions = versions.len(), operations, "Changeset exported");

        self.phase = ExportPhase::Idle;
        Ok(operations)
    }
}

/// Single-line comment excerpt of at most `PROGRESS_COMMENT_LIMIT` chars
pub fn summarize_comment(comment: &str) -> String {
    let line = comment.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= PROGRESS_COMMENT_LIMIT {
        return line;
    }
    let mut short: String = line.chars().take(PROGRESS_COMMENT_LIMIT - 3).collect();
    short.push_str("...");
    short
}
