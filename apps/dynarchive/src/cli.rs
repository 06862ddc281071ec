//! Option groups shared by the tools.
//!
//! Every tool flattens the groups it needs into its own parser, so a flag
//! has the same name, meaning and precedence everywhere.

use std::path::PathBuf;

use clap::Args;
use dynarchive_core::{
    ArchiveResult, ConfigFile, Connection, ConnectionOverrides, ReadJob, RunOverrides, RunSettings,
};

/// Flags every tool accepts.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// JSON config file [default: config.json, optional]
    #[arg(long, env = "DYNARCHIVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log verbosity: 1-9 info, 10-49 debug, 50-99 trace
    #[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(1..=99))]
    pub debug: Option<u8>,
}

impl GlobalOptions {
    /// Load the config file named by `--config`, or the default one.
    pub fn load_config(&self) -> ArchiveResult<ConfigFile> {
        ConfigFile::resolve(self.config.as_deref())
    }
}

/// Connection flags of a tool that works on a single table.
#[derive(Debug, Clone, Default, Args)]
pub struct TableConnection {
    /// Environment profile from the config file
    #[arg(long)]
    pub env: Option<String>,

    /// Access key id
    #[arg(long)]
    pub key: Option<String>,

    /// Secret access key
    #[arg(long)]
    pub secret: Option<String>,

    /// Region
    #[arg(long)]
    pub region: Option<String>,

    /// Endpoint URL, e.g. a local DynamoDB
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl TableConnection {
    /// Resolve the connection, using `fallback_env` when `--env` is absent.
    pub fn resolve(&self, file: &ConfigFile, fallback_env: Option<&str>) -> ArchiveResult<Connection> {
        let overrides = ConnectionOverrides {
            access_key_id: self.key.clone(),
            secret_access_key: self.secret.clone(),
            region: self.region.clone(),
            endpoint_url: self.endpoint.clone(),
        };
        file.connection(self.env.as_deref().or(fallback_env), &overrides)
    }
}

/// Connection flags for the source side of a two-table tool.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceConnection {
    /// Source environment profile [default: config srcenv]
    #[arg(long)]
    pub srcenv: Option<String>,

    /// Source access key id
    #[arg(long)]
    pub srckey: Option<String>,

    /// Source secret access key
    #[arg(long)]
    pub srcsecret: Option<String>,

    /// Source region
    #[arg(long)]
    pub srcregion: Option<String>,

    /// Source endpoint URL
    #[arg(long)]
    pub srcendpoint: Option<String>,
}

impl SourceConnection {
    /// Resolve the source connection.
    pub fn resolve(&self, file: &ConfigFile) -> ArchiveResult<Connection> {
        TableConnection {
            env: self.srcenv.clone(),
            key: self.srckey.clone(),
            secret: self.srcsecret.clone(),
            region: self.srcregion.clone(),
            endpoint: self.srcendpoint.clone(),
        }
        .resolve(file, file.srcenv.as_deref())
    }
}

/// Connection flags for the destination side of a two-table tool.
#[derive(Debug, Clone, Default, Args)]
pub struct DestConnection {
    /// Destination environment profile [default: config destenv]
    #[arg(long)]
    pub destenv: Option<String>,

    /// Destination access key id
    #[arg(long)]
    pub destkey: Option<String>,

    /// Destination secret access key
    #[arg(long)]
    pub destsecret: Option<String>,

    /// Destination region
    #[arg(long)]
    pub destregion: Option<String>,

    /// Destination endpoint URL
    #[arg(long)]
    pub destendpoint: Option<String>,
}

impl DestConnection {
    /// Resolve the destination connection.
    pub fn resolve(&self, file: &ConfigFile) -> ArchiveResult<Connection> {
        TableConnection {
            env: self.destenv.clone(),
            key: self.destkey.clone(),
            secret: self.destsecret.clone(),
            region: self.destregion.clone(),
            endpoint: self.destendpoint.clone(),
        }
        .resolve(file, file.destenv.as_deref())
    }
}

/// Flags that shape how the source table is read.
#[derive(Debug, Clone, Default, Args)]
pub struct ReadOptions {
    /// Secondary index to read instead of the base table
    #[arg(long)]
    pub index: Option<String>,

    /// Legacy KeyConditions as JSON; switches from Scan to Query
    #[arg(long)]
    pub query: Option<String>,

    /// Continuation key of an interrupted run, as JSON
    #[arg(long)]
    pub lastkey: Option<String>,
}

impl ReadOptions {
    /// Resolve the read job for `table`, merging flags over the config file.
    pub fn job(&self, table: &str, file: &ConfigFile, rate: Option<u64>) -> ArchiveResult<ReadJob> {
        let overrides = RunOverrides {
            rate,
            query: self.query.clone(),
            lastkey: self.lastkey.clone(),
        };
        Ok(ReadJob {
            table_name: table.to_owned(),
            index_name: self.index.clone(),
            settings: RunSettings::resolve(file, &overrides)?,
        })
    }
}
