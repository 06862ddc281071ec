//! Load newline-delimited JSON items from stdin into a DynamoDB table.

use clap::Parser;
use dynarchive::{restore, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = restore::Options::parse();
    telemetry::init_tracing(opts.global.debug)?;
    restore::run(&opts).await
}
