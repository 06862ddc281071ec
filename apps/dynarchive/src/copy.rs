//! `dynamo-copy`: copy every item of one table into another.

use anyhow::{Context, Result};
use clap::Parser;
use dynarchive_aws::connect;
use dynarchive_core::TokioClock;
use dynarchive_core::tasks::copy_table;
use tracing::info;

use crate::cli::{DestConnection, GlobalOptions, ReadOptions, SourceConnection};

/// Copy every item of a DynamoDB table into an existing table, paced by the
/// capacity of both.
#[derive(Debug, Parser)]
#[allow(missing_docs)]
#[command(name = "dynamo-copy", version, about)]
pub struct Options {
    /// Table to read from
    #[arg(long)]
    pub srctable: String,

    /// Table to write to; it must already exist
    #[arg(long)]
    pub desttable: String,

    #[command(flatten)]
    pub source: SourceConnection,

    #[command(flatten)]
    pub dest: DestConnection,

    #[command(flatten)]
    pub read: ReadOptions,

    /// Percentage of the paced capacity to use [default: config rate, then 100]
    #[arg(long)]
    pub rate: Option<u64>,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Run the copy.
pub async fn run(opts: &Options) -> Result<()> {
    let file = opts.global.load_config()?;
    let job = opts.read.job(&opts.srctable, &file, opts.rate)?;
    let source = connect(&opts.source.resolve(&file)?).await;
    let dest = connect(&opts.dest.resolve(&file)?).await;

    let report = copy_table(&source, &dest, &TokioClock, &job, &opts.desttable)
        .await
        .with_context(|| format!("failed to copy {} to {}", opts.srctable, opts.desttable))?;
    info!(
        pages = report.pages,
        items = report.items,
        "copy complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_copy_flags() {
        let opts = Options::try_parse_from([
            "dynamo-copy",
            "--srctable",
            "Orders",
            "--desttable",
            "OrdersCopy",
            "--srcenv",
            "prod",
            "--destenv",
            "local",
            "--rate",
            "50",
            "--debug",
            "10",
        ])
        .expect("parse");
        assert_eq!(opts.srctable, "Orders");
        assert_eq!(opts.desttable, "OrdersCopy");
        assert_eq!(opts.source.srcenv.as_deref(), Some("prod"));
        assert_eq!(opts.dest.destenv.as_deref(), Some("local"));
        assert_eq!(opts.rate, Some(50));
        assert_eq!(opts.global.debug, Some(10));
    }

    #[test]
    fn test_should_require_both_tables() {
        assert!(Options::try_parse_from(["dynamo-copy", "--srctable", "Orders"]).is_err());
    }
}
