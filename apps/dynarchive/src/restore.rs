//! `dynamo-restore`: load an archive from stdin into a table.

use anyhow::{Context, Result};
use clap::Parser;
use dynarchive_aws::connect;
use dynarchive_core::tasks::restore_table;
use dynarchive_core::{RunOverrides, RunSettings, TokioClock};
use tokio::io::BufReader;
use tracing::info;

use crate::cli::{GlobalOptions, TableConnection};

/// Read newline-delimited JSON items from stdin and write them into an
/// existing DynamoDB table.
#[derive(Debug, Parser)]
#[allow(missing_docs)]
#[command(name = "dynamo-restore", version, about)]
pub struct Options {
    /// Table to write to
    #[arg(long)]
    pub table: String,

    #[command(flatten)]
    pub connection: TableConnection,

    /// Percentage of the paced write capacity to use [default: config rate, then 100]
    #[arg(long)]
    pub rate: Option<u64>,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Run the restore.
pub async fn run(opts: &Options) -> Result<()> {
    let file = opts.global.load_config()?;
    let overrides = RunOverrides {
        rate: opts.rate,
        ..RunOverrides::default()
    };
    let settings = RunSettings::resolve(&file, &overrides)?;
    let client = connect(&opts.connection.resolve(&file, file.destenv.as_deref())?).await;

    let stdin = BufReader::new(tokio::io::stdin());
    let report = restore_table(stdin, &client, &TokioClock, &opts.table, &settings)
        .await
        .with_context(|| format!("failed to restore into {}", opts.table))?;
    info!(lines = report.lines, items = report.items, "restore complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_restore_flags() {
        let opts = Options::try_parse_from([
            "dynamo-restore",
            "--table",
            "Orders",
            "--endpoint",
            "http://localhost:8000",
            "--rate",
            "25",
        ])
        .expect("parse");
        assert_eq!(opts.table, "Orders");
        assert_eq!(opts.connection.endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(opts.rate, Some(25));
    }
}
