//! Paced replication of DynamoDB tables.
//!
//! This crate holds everything the table tools share: configuration
//! resolution, the [`TableClient`] abstraction over the remote service, the
//! pacing calculator, the paginated [`Replicator`] that feeds items into a
//! [`Sink`], schema copy and restore, the per-tool entry points in
//! [`tasks`], and an in-memory client for tests.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]

pub mod client;
pub mod config;
mod error;
pub mod memory;
pub mod pacing;
pub mod replicator;
pub mod restore;
pub mod schema;
pub mod sink;
pub mod tasks;

pub use client::TableClient;
pub use config::{
    ConfigFile, Connection, ConnectionOverrides, RunOverrides, RunSettings, StaticCredentials,
};
pub use error::{ArchiveError, ArchiveResult};
pub use pacing::{Clock, ManualClock, Throttle, TokioClock};
pub use replicator::{ReadMode, ReplicationOptions, ReplicationReport, Replicator};
pub use sink::{JsonLinesSink, Sink, TableSink};
pub use tasks::ReadJob;
