//! CLI Tooling
//!
//! Command-line surface for exporting history, inspecting checkpoints and resetting
//! them.

use crate::config::{validate_branch, ConfigLoader, ExportConfig};
use crate::emit::{
    CheckpointTiming, DataMode, ExportOptions, ExportSummary, Exporter, FastImportWriter,
};
use crate::error::ExportError;
use crate::logging::{logs_to_stdout, LoggingConfig};
use crate::sink::OutputSink;
use crate::source::{HistorySource, ManifestSource};
use crate::store::{CheckpointStore, SledCheckpointStore};
use crate::tooling::format::{format_export_summary, format_status_text, StatusEntry, StatusOutput};
use crate::types::ChangesetId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

/// Asset Export - convert asset server history into a git fast-import stream
#[derive(Parser)]
#[command(name = "asset-export")]
#[command(about = "Convert asset server history into a git fast-import commit stream")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply `--log-*` flags on top of the loaded logging config
    pub fn apply_logging_overrides(&self, logging: &mut LoggingConfig) {
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Export changesets after the last checkpoint as a fast-import stream
    Export {
        /// History manifest (overrides source.manifest)
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Checkpoint key (overrides source.name and the manifest's name)
        #[arg(long)]
        source_name: Option<String>,
        /// Target branch (overrides export.branch)
        #[arg(long)]
        branch: Option<String>,
        /// Ignore the stored checkpoint and export from the baseline
        #[arg(long)]
        full: bool,
        /// Write payload stubs instead of payload bytes
        #[arg(long)]
        no_data: bool,
        /// Baseline changeset for a fresh export
        #[arg(long)]
        since: Option<ChangesetId>,
        /// Write the stream to a file ("-" for stdout)
        #[arg(long, conflicts_with = "git_dir")]
        output: Option<PathBuf>,
        /// Pipe the stream into `git fast-import` for this git directory
        #[arg(long)]
        git_dir: Option<PathBuf>,
    },
    /// Show stored checkpoints
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Clear a stored checkpoint so the next export starts fresh
    Reset {
        /// Checkpoint key (defaults to the configured source)
        #[arg(long)]
        source: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

impl Commands {
    /// Sink selected by an export command
    pub fn output_sink(&self) -> Option<OutputSink> {
        match self {
            Commands::Export {
                output, git_dir, ..
            } => Some(match (output, git_dir) {
                (_, Some(git_dir)) => OutputSink::GitFastImport {
                    git_dir: git_dir.clone(),
                },
                (Some(path), None) if path.as_os_str() != "-" => OutputSink::File(path.clone()),
                _ => OutputSink::Stdout,
            }),
            _ => None,
        }
    }
}

/// Loaded configuration plus the opened checkpoint store
pub struct CliContext {
    config: ExportConfig,
    checkpoints: SledCheckpointStore,
    checkpoint_path: PathBuf,
}

impl CliContext {
    /// Load configuration (explicit file or standard layers) and open the store
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ExportError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => {
                let cwd = std::env::current_dir()?;
                ConfigLoader::load(&cwd)?
            }
        };
        Self::with_config(config)
    }

    /// Build a context from an already loaded configuration
    pub fn with_config(config: ExportConfig) -> Result<Self, ExportError> {
        config.validate()?;
        let checkpoint_path = config.export.resolve_checkpoint_path()?;
        let checkpoints = SledCheckpointStore::open(&checkpoint_path)?;
        Ok(Self {
            config,
            checkpoints,
            checkpoint_path,
        })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ExportConfig {
        &mut self.config
    }

    pub fn checkpoints(&self) -> &dyn CheckpointStore {
        &self.checkpoints
    }

    /// Reject logging setups that would interleave with a stream on stdout
    pub fn check_logging(&self, command: &Commands) -> Result<(), ExportError> {
        let stream_on_stdout = command
            .output_sink()
            .map(|sink| sink.is_stdout())
            .unwrap_or(false);
        if stream_on_stdout && logs_to_stdout(Some(&self.config.logging))? {
            return Err(ExportError::ConfigError(
                "Log output includes stdout while the commit stream is written to stdout; \
                 use --log-output stderr or --output <file>"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ExportError> {
        match command {
            Commands::Export {
                manifest,
                source_name,
                branch,
                full,
                no_data,
                since,
                ..
            } => {
                let manifest = manifest
                    .clone()
                    .or_else(|| self.config.source.manifest.clone())
                    .ok_or_else(|| {
                        ExportError::ConfigError(
                            "No history manifest configured (use --manifest or source.manifest)"
                                .to_string(),
                        )
                    })?;
                let mut source = ManifestSource::open(&manifest)?;
                if let Some(name) = source_name.clone().or_else(|| self.config.source.name.clone())
                {
                    source = source.with_name(name);
                }

                let branch = branch
                    .clone()
                    .unwrap_or_else(|| self.config.export.branch.clone());
                validate_branch(&branch)?;
                let options = ExportOptions {
                    branch,
                    timezone: self.config.export.timezone.clone(),
                    full: *full,
                    since: *since,
                    ..ExportOptions::default()
                };
                let mode = if *no_data || self.config.export.nodata {
                    DataMode::Stub
                } else {
                    DataMode::Inline
                };
                let sink = command.output_sink().unwrap_or(OutputSink::Stdout);

                let summary = self.run_export(&source, options, mode, &sink)?;
                if sink.is_stdout() {
                    Ok(String::new())
                } else {
                    Ok(format_export_summary(&summary, &sink))
                }
            }
            Commands::Status { format } => self.status(format),
            Commands::Reset { source, yes } => self.reset(source.as_deref(), *yes),
        }
    }

    /// Run one export into `sink`, closing the sink on success and on failure.
    ///
    /// A piped importer only acknowledges the stream when it exits, so its
    /// checkpoint is saved after `finish` succeeds.
    pub fn run_export(
        &self,
        source: &dyn HistorySource,
        mut options: ExportOptions,
        mode: DataMode,
        sink: &OutputSink,
    ) -> Result<ExportSummary, ExportError> {
        info!(source = source.name(), sink = %sink, "Export requested");
        if matches!(sink, OutputSink::GitFastImport { .. }) {
            options.checkpoints = CheckpointTiming::Deferred;
        }
        let mut handle = sink.open()?;
        let result = {
            let mut writer = FastImportWriter::new(&mut handle, mode);
            Exporter::new(source, &self.checkpoints, options).run(&mut writer)
        };
        match result {
            Ok(summary) => {
                handle.finish()?;
                if let Some(checkpoint) = &summary.pending_checkpoint {
                    self.checkpoints.save(source.name(), checkpoint)?;
                }
                Ok(summary)
            }
            Err(e) => {
                if let Err(finish_err) = handle.finish() {
                    warn!("Failed to close output after error: {}", finish_err);
                }
                Err(e)
            }
        }
    }

    fn status(&self, format: &str) -> Result<String, ExportError> {
        let sources: Vec<StatusEntry> = self
            .checkpoints
            .list()?
            .into_iter()
            .map(|(source, cp)| StatusEntry::new(source, &cp))
            .collect();
        let output = StatusOutput {
            checkpoint_path: self.checkpoint_path.display().to_string(),
            total: sources.len(),
            sources,
        };

        match format {
            "json" => serde_json::to_string_pretty(&output).map_err(|e| {
                ExportError::ConfigError(format!("Failed to serialize status: {}", e))
            }),
            "text" => Ok(format_status_text(&output)),
            other => Err(ExportError::ConfigError(format!(
                "Invalid format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }

    fn reset(&self, source: Option<&str>, yes: bool) -> Result<String, ExportError> {
        let name = match source {
            Some(name) => name.to_string(),
            None => self.configured_source_name()?,
        };

        if !yes {
            let confirmed = dialoguer::Confirm::new()
                .with_prompt(format!(
                    "Clear the checkpoint for '{}'? The next export starts from the baseline",
                    name
                ))
                .default(false)
                .interact()
                .map_err(|e| ExportError::ConfigError(format!("Confirmation failed: {}", e)))?;
            if !confirmed {
                return Ok("Aborted.".to_string());
            }
        }

        if self.checkpoints.clear(&name)? {
            info!(source = %name, "Checkpoint cleared");
            Ok(format!("Checkpoint for '{}' cleared.", name))
        } else {
            Ok(format!("No checkpoint stored for '{}'.", name))
        }
    }

    fn configured_source_name(&self) -> Result<String, ExportError> {
        if let Some(name) = &self.config.source.name {
            return Ok(name.clone());
        }
        match &self.config.source.manifest {
            Some(manifest) => Ok(ManifestSource::open(manifest)?.name().to_string()),
            None => Err(ExportError::ConfigError(
                "No source given (use --source, source.name or source.manifest)".to_string(),
            )),
        }
    }
}
