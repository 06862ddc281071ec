//! Create a DynamoDB table with the structure of another.

use clap::Parser;
use dynarchive::{structure, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = structure::Options::parse();
    telemetry::init_tracing(opts.global.debug)?;
    structure::run(&opts).await
}
