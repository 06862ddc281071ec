//! Print the first records of a DynamoDB table.

use clap::Parser;
use dynarchive::{top, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = top::Options::parse();
    telemetry::init_tracing(opts.global.debug)?;
    top::run(&opts).await
}
