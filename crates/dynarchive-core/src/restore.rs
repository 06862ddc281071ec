//! Loading an archive back into a table.
//!
//! The input is the format `dynamo-archive` writes: one wire-format item per
//! line. Each item is written with `PutItem` and paced against the
//! destination's write capacity, exactly like the write side of a copy.

use dynarchive_model::Item;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::client::TableClient;
use crate::error::{ArchiveError, ArchiveResult};
use crate::pacing::{Clock, Throttle};
use crate::sink::{Sink, TableSink};

/// Summary of a finished restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Lines read, including blank ones.
    pub lines: u64,
    /// Items written.
    pub items: u64,
}

/// Write every item read from `reader` into `table_name`.
///
/// Blank lines are skipped. The first malformed line or failed write ends
/// the restore; items before it stay written.
pub async fn restore<R, C, K>(
    reader: R,
    client: &C,
    clock: &K,
    table_name: &str,
    write_msec_per_item: u64,
) -> ArchiveResult<RestoreReport>
where
    R: AsyncBufRead + Unpin,
    C: TableClient + ?Sized,
    K: Clock + ?Sized,
{
    let throttle = Throttle::new(clock.now(), write_msec_per_item);
    let mut sink = TableSink::new(client, table_name);
    let mut report = RestoreReport::default();
    let mut lines = reader.lines();

    debug!(table = table_name, write_msec_per_item, "starting restore");
    while let Some(line) = lines.next_line().await? {
        report.lines += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let item: Item = serde_json::from_str(line).map_err(|e| ArchiveError::Input {
            line: report.lines,
            message: e.to_string(),
        })?;
        sink.accept(item).await?;
        report.items += 1;
        throttle.wait(clock, report.items).await;
    }
    sink.finish().await?;

    info!(
        table = table_name,
        lines = report.lines,
        items = report.items,
        "restore finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dynarchive_model::AttributeValue;

    use super::*;
    use crate::memory::MemoryTableClient;
    use crate::pacing::ManualClock;

    fn dest() -> MemoryTableClient {
        let client = MemoryTableClient::new();
        client.add_table("T", "id", 1, 10);
        client
    }

    #[tokio::test]
    async fn test_should_restore_archive_lines() {
        let client = dest();
        let clock = ManualClock::new();
        let input = b"{\"id\":{\"S\":\"a\"},\"blob\":{\"B\":\"aGk=\"}}\n\n{\"id\":{\"S\":\"b\"}}\n";
        let report = restore(&input[..], &client, &clock, "T", 100).await.unwrap();

        assert_eq!(report, RestoreReport { lines: 3, items: 2 });
        let items = client.items("T");
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].get("blob"),
            Some(&AttributeValue::B(bytes::Bytes::from_static(b"hi")))
        );
        assert_eq!(clock.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_should_report_line_of_malformed_item() {
        let client = dest();
        let clock = ManualClock::new();
        let input = b"{\"id\":{\"S\":\"a\"}}\n{\"id\":{\"X\":\"b\"}}\n{\"id\":{\"S\":\"c\"}}\n";
        let err = restore(&input[..], &client, &clock, "T", 0).await.unwrap_err();

        assert!(matches!(err, ArchiveError::Input { line: 2, .. }));
        assert_eq!(client.items("T").len(), 1);
    }

    #[tokio::test]
    async fn test_should_stop_on_failed_write() {
        let client = dest();
        client.fail_put_at(1);
        let clock = ManualClock::new();
        let input = b"{\"id\":{\"S\":\"a\"}}\n{\"id\":{\"S\":\"b\"}}\n";
        assert!(restore(&input[..], &client, &clock, "T", 0).await.is_err());
        assert_eq!(client.put_count(), 1);
    }

    #[tokio::test]
    async fn test_should_accept_empty_input() {
        let client = dest();
        let clock = ManualClock::new();
        let report = restore(&b""[..], &client, &clock, "T", 100).await.unwrap();
        assert_eq!(report, RestoreReport::default());
        assert!(clock.sleeps().is_empty());
    }
}
