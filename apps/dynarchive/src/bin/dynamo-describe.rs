//! Print the description of a DynamoDB table.

use clap::Parser;
use dynarchive::{describe, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = describe::Options::parse();
    telemetry::init_tracing(opts.global.debug)?;
    describe::run(&opts).await
}
