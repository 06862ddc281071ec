//! `dynamo-top`: print the first records of a table.

use anyhow::{Context, Result};
use clap::Parser;
use dynarchive_aws::connect;
use dynarchive_core::{ArchiveResult, ConfigFile, ReadJob, TokioClock};
use dynarchive_core::pacing::DEFAULT_RATE;
use dynarchive_core::tasks::top_items;
use tokio::io::BufWriter;
use tracing::info;

use crate::cli::{GlobalOptions, ReadOptions, TableConnection};

/// Print the first records of a DynamoDB table to stdout, one JSON object per
/// line.
#[derive(Debug, Parser)]
#[allow(missing_docs)]
#[command(name = "dynamo-top", version, about)]
pub struct Options {
    /// Table to read
    #[arg(long)]
    pub table: String,

    /// Number of records to print [default: config rate, then 100]
    #[arg(long, alias = "rate", value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,

    #[command(flatten)]
    pub connection: TableConnection,

    #[command(flatten)]
    pub read: ReadOptions,

    #[command(flatten)]
    pub global: GlobalOptions,
}

impl Options {
    /// Records to print.
    #[must_use]
    pub fn record_count(&self, file: &ConfigFile) -> u64 {
        self.count.or(file.rate).unwrap_or(DEFAULT_RATE)
    }

    /// The read job. The config file's `rate` is the record count here, so
    /// reads always use the full paced capacity.
    pub fn job(&self, file: &ConfigFile) -> ArchiveResult<ReadJob> {
        self.read.job(&self.table, file, Some(DEFAULT_RATE))
    }
}

/// Print the records.
pub async fn run(opts: &Options) -> Result<()> {
    let file = opts.global.load_config()?;
    let count = opts.record_count(&file);
    let job = opts.job(&file)?;
    let client = connect(&opts.connection.resolve(&file, file.srcenv.as_deref())?).await;

    let stdout = BufWriter::new(tokio::io::stdout());
    let report = top_items(&client, &TokioClock, &job, count, stdout)
        .await
        .with_context(|| format!("failed to read {}", opts.table))?;
    info!(requested = count, items = report.items, "top complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_accept_rate_as_count_alias() {
        let opts =
            Options::try_parse_from(["dynamo-top", "--table", "T", "--rate", "7"]).expect("parse");
        assert_eq!(opts.count, Some(7));
        let opts =
            Options::try_parse_from(["dynamo-top", "--table", "T", "--count", "3"]).expect("parse");
        assert_eq!(opts.count, Some(3));
    }

    #[test]
    fn test_should_reject_zero_count() {
        assert!(Options::try_parse_from(["dynamo-top", "--table", "T", "--count", "0"]).is_err());
    }

    #[test]
    fn test_should_default_count_from_config_then_constant() {
        let opts = Options::try_parse_from(["dynamo-top", "--table", "T"]).expect("parse");
        assert_eq!(opts.record_count(&ConfigFile::default()), 100);
        let file = ConfigFile::from_json(r#"{"rate": 12}"#).expect("config");
        assert_eq!(opts.record_count(&file), 12);

        let opts = Options::try_parse_from(["dynamo-top", "--table", "T", "--count", "5"])
            .expect("parse");
        assert_eq!(opts.record_count(&file), 5);
    }

    #[test]
    fn test_should_keep_count_apart_from_rate() {
        let opts = Options::try_parse_from(["dynamo-top", "--table", "T"]).expect("parse");
        let file = ConfigFile::from_json(r#"{"rate": 0}"#).expect("config");
        assert_eq!(opts.record_count(&file), 0);
        let job = opts.job(&file).expect("job");
        assert_eq!(job.settings.rate, DEFAULT_RATE);

        let file = ConfigFile::from_json(r#"{"rate": 12}"#).expect("config");
        assert_eq!(opts.job(&file).expect("job").settings.rate, DEFAULT_RATE);
    }
}
