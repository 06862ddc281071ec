//! `dynamo-archive`: dump a table to stdout as newline-delimited JSON.

use anyhow::{Context, Result};
use clap::Parser;
use dynarchive_aws::connect;
use dynarchive_core::TokioClock;
use dynarchive_core::tasks::archive_table;
use tokio::io::BufWriter;
use tracing::info;

use crate::cli::{GlobalOptions, ReadOptions, TableConnection};

/// Write every item of a DynamoDB table to stdout, one JSON object per line.
#[derive(Debug, Parser)]
#[allow(missing_docs)]
#[command(name = "dynamo-archive", version, about)]
pub struct Options {
    /// Table to archive
    #[arg(long)]
    pub table: String,

    #[command(flatten)]
    pub connection: TableConnection,

    #[command(flatten)]
    pub read: ReadOptions,

    /// Percentage of the paced read capacity to use [default: config rate, then 100]
    #[arg(long)]
    pub rate: Option<u64>,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Run the archive.
pub async fn run(opts: &Options) -> Result<()> {
    let file = opts.global.load_config()?;
    let job = opts.read.job(&opts.table, &file, opts.rate)?;
    let client = connect(&opts.connection.resolve(&file, file.srcenv.as_deref())?).await;

    let stdout = BufWriter::new(tokio::io::stdout());
    let report = archive_table(&client, &TokioClock, &job, stdout)
        .await
        .with_context(|| format!("failed to archive {}", opts.table))?;
    info!(pages = report.pages, items = report.items, "archive complete");
    Ok(())
}
