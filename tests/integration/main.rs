//! Integration tests for asset history export

mod cli_contracts;
mod export_stream;
mod support;
