//! Dump a DynamoDB table to stdout as newline-delimited JSON.

use clap::Parser;
use dynarchive::{archive, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = archive::Options::parse();
    telemetry::init_tracing(opts.global.debug)?;
    archive::run(&opts).await
}
