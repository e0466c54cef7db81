//! Output sinks for the commit stream.

use crate::error::ExportError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Where the commit stream goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    Stdout,
    File(PathBuf),
    /// Pipe into `git fast-import` running against this git directory
    GitFastImport { git_dir: PathBuf },
}

impl OutputSink {
    pub fn is_stdout(&self) -> bool {
        matches!(self, OutputSink::Stdout)
    }

    /// Open the sink for writing
    pub fn open(&self) -> Result<SinkHandle, ExportError> {
        match self {
            OutputSink::Stdout => Ok(SinkHandle {
                writer: BufWriter::new(Box::new(std::io::stdout())),
                child: None,
            }),
            OutputSink::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let file = File::create(path)?;
                Ok(SinkHandle {
                    writer: BufWriter::new(Box::new(file)),
                    child: None,
                })
            }
            OutputSink::GitFastImport { git_dir } => {
                let mut child = Command::new("git")
                    .arg(format!("--git-dir={}", git_dir.display()))
                    .arg("fast-import")
                    .arg("--quiet")
                    .stdin(Stdio::piped())
                    .spawn()
                    .map_err(|e| {
                        ExportError::ImporterFailed(format!("Failed to spawn git fast-import: {}", e))
                    })?;
                let stdin = child.stdin.take().ok_or_else(|| {
                    ExportError::ImporterFailed("git fast-import stdin unavailable".to_string())
                })?;
                tracing::info!(git_dir = %git_dir.display(), "Piping into git fast-import");
                Ok(SinkHandle {
                    writer: BufWriter::new(Box::new(stdin)),
                    child: Some(child),
                })
            }
        }
    }
}

impl std::fmt::Display for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputSink::Stdout => write!(f, "stdout"),
            OutputSink::File(path) => write!(f, "{}", path.display()),
            OutputSink::GitFastImport { git_dir } => {
                write!(f, "git fast-import ({})", git_dir.display())
            }
        }
    }
}

/// Open sink; `finish` must be called to close pipes and reap the importer
pub struct SinkHandle {
    writer: BufWriter<Box<dyn Write + Send>>,
    child: Option<Child>,
}

impl SinkHandle {
    /// Flush, close the importer's stdin and wait for it to exit
    pub fn finish(self) -> Result<(), ExportError> {
        let SinkHandle { mut writer, child } = self;
        writer.flush()?;
        drop(writer);

        if let Some(mut child) = child {
            let status = child.wait()?;
            if !status.success() {
                return Err(ExportError::ImporterFailed(format!(
                    "git fast-import exited with {}",
                    status
                )));
            }
        }
        Ok(())
    }
}

impl Write for SinkHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
