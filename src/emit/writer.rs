//! Fast-import stream serializer.
//!
//! Writes the line-oriented commit stream understood by `git fast-import`.

use crate::diff::Operation;
use crate::error::ExportError;
use crate::source::HistorySource;
use crate::types::{ChangesetId, PayloadHandle};
use std::io::{Read, Write};

/// File mode for every emitted blob
pub const FILE_MODE: &str = "644";

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// How payload bytes reach the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    /// Stream payload bytes inline
    Inline,
    /// Write a `StreamData<handle>` stub instead of the payload
    Stub,
}

/// How a commit attaches to the branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// First commit of a fresh export: `deleteall`
    Reset,
    /// Follow a commit written earlier in this stream
    Mark(ChangesetId),
    /// Follow the current tip of the branch (first commit of a resumed run)
    BranchTip,
}

/// Commit header fields
#[derive(Debug, Clone)]
pub struct CommitHeader<'a> {
    pub branch: &'a str,
    pub mark: ChangesetId,
    /// `Name <email>`
    pub ident: &'a str,
    pub timestamp: i64,
    /// `+HHMM` / `-HHMM`
    pub timezone: &'a str,
    pub message: &'a str,
}

/// Serializer over any byte sink
pub struct FastImportWriter<W: Write> {
    out: W,
    mode: DataMode,
}

impl<W: Write> FastImportWriter<W> {
    pub fn new(out: W, mode: DataMode) -> Self {
        Self { out, mode }
    }

    /// Commit header, message and branch linkage
    pub fn begin_commit(
        &mut self,
        header: &CommitHeader<'_>,
        linkage: Linkage,
    ) -> Result<(), ExportError> {
        writeln!(self.out, "commit refs/heads/{}", header.branch)?;
        writeln!(self.out, "mark :{}", header.mark)?;
        writeln!(
            self.out,
            "author {} {} {}",
            header.ident, header.timestamp, header.timezone
        )?;
        writeln!(
            self.out,
            "committer {} {} {}",
            header.ident, header.timestamp, header.timezone
        )?;
        self.data(header.message.as_bytes())?;
        match linkage {
            Linkage::Reset => writeln!(self.out, "deleteall")?,
            Linkage::Mark(previous) => writeln!(self.out, "from :{}", previous)?,
            Linkage::BranchTip => writeln!(self.out, "from refs/heads/{}^0", header.branch)?,
        }
        Ok(())
    }

    /// One file operation; payloads are opened through `source`
    pub fn write_operation(
        &mut self,
        op: &Operation,
        source: &dyn HistorySource,
    ) -> Result<(), ExportError> {
        match op {
            Operation::Modify { path, handle } => {
                writeln!(self.out, "M {} inline {}", FILE_MODE, quote_path(path))?;
                match self.mode {
                    DataMode::Inline => self.payload(*handle, source)?,
                    DataMode::Stub => self.data(stub_payload(*handle).as_bytes())?,
                }
            }
            Operation::Delete { path } => {
                writeln!(self.out, "D {}", quote_path(path))?;
            }
            Operation::Rename { from, to } => {
                writeln!(self.out, "R {} {}", quote_path(from), quote_path(to))?;
            }
            Operation::CreateDirectoryPlaceholder { path, contents } => {
                writeln!(self.out, "M {} inline {}", FILE_MODE, quote_path(path))?;
                self.data(contents)?;
            }
        }
        Ok(())
    }

    /// Blank line closing a commit
    pub fn end_commit(&mut self) -> Result<(), ExportError> {
        writeln!(self.out)?;
        Ok(())
    }

    /// `progress` line; embedded line breaks are flattened
    pub fn progress(&mut self, text: &str) -> Result<(), ExportError> {
        let line: String = text
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        writeln!(self.out, "progress {}", line)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ExportError> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), ExportError> {
        writeln!(self.out, "data {}", bytes.len())?;
        self.out.write_all(bytes)?;
        writeln!(self.out)?;
        Ok(())
    }

    /// Copy exactly the announced number of bytes; a short read is fatal.
    fn payload(
        &mut self,
        handle: PayloadHandle,
        source: &dyn HistorySource,
    ) -> Result<(), ExportError> {
        let payload = source.open_payload(handle)?;
        writeln!(self.out, "data {}", payload.len)?;

        let mut reader = payload.reader.take(payload.len);
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut copied: u64 = 0;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(ExportError::PayloadReadFailure {
                        handle,
                        reason: e.to_string(),
                    })
                }
            };
            self.out.write_all(&buf[..n])?;
            copied += n as u64;
        }

        if copied != payload.len {
            return Err(ExportError::PayloadReadFailure {
                handle,
                reason: format!("expected {} bytes, read {}", payload.len, copied),
            });
        }
        writeln!(self.out)?;
        Ok(())
    }
}

/// Stub payload written instead of real bytes in `nodata` runs
pub fn stub_payload(handle: PayloadHandle) -> String {
    format!("StreamData{}\n", handle)
}

/// C-style quoted path as accepted by fast-import
pub fn quote_path(path: &str) -> String {
    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push('"');
    for c in path.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                quoted.push_str(&format!("\\{:03o}", c as u32));
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
