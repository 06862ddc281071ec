//! Copy every item of a DynamoDB table into another table.

use clap::Parser;
use dynarchive::{copy, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = copy::Options::parse();
    telemetry::init_tracing(opts.global.debug)?;
    copy::run(&opts).await
}
