//! Asset Export: asset server history as a git fast-import stream
//!
//! Replays the changesets of a GUID-addressed asset store, tracks where every asset
//! lives in a naming tree, and writes one fast-import commit per changeset. Progress
//! is checkpointed so later runs continue where the last one stopped.

pub mod config;
pub mod diff;
pub mod emit;
pub mod error;
pub mod logging;
pub mod order;
pub mod sink;
pub mod source;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
