//! `dynamo-copy-structure`: create a table with another table's key schema.

use anyhow::{Context, Result};
use clap::Parser;
use dynarchive_aws::connect;
use dynarchive_core::schema::copy_structure;
use dynarchive_core::{ArchiveResult, TableClient};

use crate::cli::{DestConnection, GlobalOptions, SourceConnection};

/// Create a DynamoDB table with the key schema, attribute definitions and
/// provisioned capacity of an existing one.
#[derive(Debug, Parser)]
#[allow(missing_docs)]
#[command(name = "dynamo-copy-structure", version, about)]
pub struct Options {
    /// Table whose structure is copied
    #[arg(long)]
    pub srctable: String,

    /// Table to create
    #[arg(long)]
    pub desttable: String,

    #[command(flatten)]
    pub source: SourceConnection,

    #[command(flatten)]
    pub dest: DestConnection,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Create `dest_table` and render the description the service returned.
pub async fn create_and_render<S, D>(
    source: &S,
    src_table: &str,
    dest: &D,
    dest_table: &str,
) -> ArchiveResult<String>
where
    S: TableClient + ?Sized,
    D: TableClient + ?Sized,
{
    let created = copy_structure(source, src_table, dest, dest_table).await?;
    Ok(serde_json::to_string_pretty(&created)?)
}

/// Create the table and print its description.
pub async fn run(opts: &Options) -> Result<()> {
    let file = opts.global.load_config()?;
    let source = connect(&opts.source.resolve(&file)?).await;
    let dest = connect(&opts.dest.resolve(&file)?).await;

    let rendered = create_and_render(&source, &opts.srctable, &dest, &opts.desttable)
        .await
        .with_context(|| {
            format!("failed to copy the structure of {} to {}", opts.srctable, opts.desttable)
        })?;
    println!("{rendered}");
    Ok(())
}
