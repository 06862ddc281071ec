//! Command-line tools for DynamoDB tables.
//!
//! Each tool lives in its own module with an `Options` parser and a `run`
//! entry point; the binaries under `src/bin` only parse, set up logging and
//! call `run`. Items are written to stdout, logs to stderr.
#![allow(clippy::doc_markdown)]

pub mod archive;
pub mod cli;
pub mod copy;
pub mod describe;
pub mod restore;
pub mod structure;
pub mod telemetry;
pub mod top;
