//! Destinations for replicated items.

use async_trait::async_trait;
use dynarchive_model::Item;
use dynarchive_model::input::PutItemInput;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::client::TableClient;
use crate::error::ArchiveResult;

/// Where the replicator forwards each item.
#[async_trait]
pub trait Sink: Send {
    /// Forward one item. A failure aborts the run.
    async fn accept(&mut self, item: Item) -> ArchiveResult<()>;

    /// Whether forwarding consumes remote write capacity and must be paced.
    fn is_remote(&self) -> bool {
        false
    }

    /// Called once after the last item.
    async fn finish(&mut self) -> ArchiveResult<()> {
        Ok(())
    }
}

/// Writes every item into a destination table with `PutItem`.
#[derive(Debug)]
pub struct TableSink<'a, C: ?Sized> {
    client: &'a C,
    table_name: String,
}

impl<'a, C: TableClient + ?Sized> TableSink<'a, C> {
    /// Write into `table_name` through `client`.
    pub fn new(client: &'a C, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// The destination table.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl<C: TableClient + ?Sized> Sink for TableSink<'_, C> {
    async fn accept(&mut self, item: Item) -> ArchiveResult<()> {
        self.client
            .put_item(PutItemInput {
                table_name: self.table_name.clone(),
                item,
                return_consumed_capacity: None,
            })
            .await?;
        Ok(())
    }

    fn is_remote(&self) -> bool {
        true
    }
}

/// Writes every item as one line of wire-format JSON.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
    lines: u64,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    /// Write lines to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Number of lines written so far.
    #[must_use]
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Sink for JsonLinesSink<W> {
    async fn accept(&mut self, item: Item) -> ArchiveResult<()> {
        let mut line = serde_json::to_vec(&item)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.lines += 1;
        Ok(())
    }

    async fn finish(&mut self) -> ArchiveResult<()> {
        self.writer.flush().await?;
        Ok(())
    }
}
