//! Commit stream emission: the fast-import serializer and the export driver.

pub mod exporter;
pub mod writer;

pub use exporter::{
    summarize_comment, CheckpointTiming, ExportOptions, ExportPhase, ExportSummary, Exporter,
};
pub use writer::{quote_path, CommitHeader, DataMode, FastImportWriter, Linkage};
