//! One function per tool: describe the tables involved, derive pacing from
//! their capacity, then run the replicator or the restore loop.

use dynarchive_model::types::TableDescription;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::info;

use crate::client::TableClient;
use crate::config::RunSettings;
use crate::error::ArchiveResult;
use crate::pacing::{Clock, DEFAULT_RATE, effective_capacity, side_msec_per_item};
use crate::replicator::{ReadMode, ReplicationOptions, ReplicationReport, Replicator};
use crate::restore::{RestoreReport, restore};
use crate::sink::{JsonLinesSink, TableSink};

/// The read side of a run.
#[derive(Debug, Clone)]
pub struct ReadJob {
    /// Source table.
    pub table_name: String,
    /// Secondary index to read instead of the base table.
    pub index_name: Option<String>,
    /// Resolved run settings.
    pub settings: RunSettings,
}

impl ReadJob {
    /// Read `table_name` with the given settings.
    pub fn new(table_name: impl Into<String>, settings: RunSettings) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: None,
            settings,
        }
    }

    /// Replicator options for a source described by `source`.
    ///
    /// Pages are as large as the paced read capacity.
    fn options(&self, source: &TableDescription, rate: u64) -> ReplicationOptions {
        let quota = self.settings.quota;
        let read_capacity = source.read_capacity_units();
        ReplicationOptions {
            table_name: self.table_name.clone(),
            index_name: self.index_name.clone(),
            read_mode: ReadMode::from_conditions(self.settings.key_conditions.clone()),
            page_limit: effective_capacity(read_capacity, quota),
            start_key: self.settings.start_key.clone(),
            read_msec_per_item: side_msec_per_item(read_capacity, quota, rate),
            write_msec_per_item: 0,
            max_items: None,
        }
    }
}

/// Copy every item of the source table into `dest_table`.
pub async fn copy_table<S, D, K>(
    source: &S,
    dest: &D,
    clock: &K,
    job: &ReadJob,
    dest_table: &str,
) -> ArchiveResult<ReplicationReport>
where
    S: TableClient + ?Sized,
    D: TableClient + ?Sized,
    K: Clock + ?Sized,
{
    let dest_desc = dest.table_description(dest_table).await?;
    let src_desc = source.table_description(&job.table_name).await?;

    let settings = &job.settings;
    let mut options = job.options(&src_desc, settings.rate);
    options.write_msec_per_item =
        side_msec_per_item(dest_desc.write_capacity_units(), settings.quota, settings.rate);
    info!(
        source = %job.table_name,
        dest = dest_table,
        read_capacity = src_desc.read_capacity_units(),
        write_capacity = dest_desc.write_capacity_units(),
        page_limit = options.page_limit,
        read_msec_per_item = options.read_msec_per_item,
        write_msec_per_item = options.write_msec_per_item,
        "copying table"
    );

    let mut sink = TableSink::new(dest, dest_table);
    Replicator::new(source, clock, options).run(&mut sink).await
}

/// Write every item of the source table to `writer`, one JSON object per
/// line.
pub async fn archive_table<S, K, W>(
    source: &S,
    clock: &K,
    job: &ReadJob,
    writer: W,
) -> ArchiveResult<ReplicationReport>
where
    S: TableClient + ?Sized,
    K: Clock + ?Sized,
    W: AsyncWrite + Unpin + Send,
{
    let src_desc = source.table_description(&job.table_name).await?;
    let options = job.options(&src_desc, job.settings.rate);
    info!(
        table = %job.table_name,
        read_capacity = src_desc.read_capacity_units(),
        page_limit = options.page_limit,
        read_msec_per_item = options.read_msec_per_item,
        "archiving table"
    );
    let mut sink = JsonLinesSink::new(writer);
    Replicator::new(source, clock, options).run(&mut sink).await
}

/// Write the first `count` items of the source table to `writer`.
///
/// Reads are paced at the full clamped capacity; the run's rate setting is
/// not applied because the tool's `--rate` flag is the item count.
pub async fn top_items<S, K, W>(
    source: &S,
    clock: &K,
    job: &ReadJob,
    count: u64,
    writer: W,
) -> ArchiveResult<ReplicationReport>
where
    S: TableClient + ?Sized,
    K: Clock + ?Sized,
    W: AsyncWrite + Unpin + Send,
{
    let src_desc = source.table_description(&job.table_name).await?;
    let mut options = job.options(&src_desc, DEFAULT_RATE);
    options.max_items = Some(count);
    let mut sink = JsonLinesSink::new(writer);
    Replicator::new(source, clock, options).run(&mut sink).await
}

/// Write every item read from `reader` into `table_name`, paced by the
/// table's write capacity.
pub async fn restore_table<R, C, K>(
    reader: R,
    dest: &C,
    clock: &K,
    table_name: &str,
    settings: &RunSettings,
) -> ArchiveResult<RestoreReport>
where
    R: AsyncBufRead + Unpin,
    C: TableClient + ?Sized,
    K: Clock + ?Sized,
{
    let desc = dest.table_description(table_name).await?;
    let write_msec =
        side_msec_per_item(desc.write_capacity_units(), settings.quota, settings.rate);
    info!(
        table = table_name,
        write_capacity = desc.write_capacity_units(),
        write_msec_per_item = write_msec,
        "restoring table"
    );
    restore(reader, dest, clock, table_name, write_msec).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use dynarchive_model::{AttributeValue, Item, Key};

    use super::*;
    use crate::error::ArchiveError;
    use crate::memory::{MemoryTableClient, RecordedRequest};
    use crate::pacing::ManualClock;

    fn item(n: u32) -> Item {
        HashMap::from([
            ("id".to_owned(), AttributeValue::S(format!("k{n:03}"))),
            ("payload".to_owned(), AttributeValue::N(n.to_string())),
        ])
    }

    fn key(n: u32) -> Key {
        HashMap::from([("id".to_owned(), AttributeValue::S(format!("k{n:03}")))])
    }

    fn tables(items: u32, rcu: i64, wcu: i64) -> (MemoryTableClient, MemoryTableClient) {
        let source = MemoryTableClient::new();
        source.add_table("Src", "id", rcu, 1);
        for n in 1..=items {
            source.insert("Src", item(n)).unwrap();
        }
        let dest = MemoryTableClient::new();
        dest.add_table("Dest", "id", 1, wcu);
        (source, dest)
    }

    fn scans(client: &MemoryTableClient) -> Vec<(Option<i32>, Key)> {
        client
            .requests()
            .into_iter()
            .filter_map(|r| match r {
                RecordedRequest::Scan(s) => Some((s.limit, s.exclusive_start_key)),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_should_copy_between_differently_sized_tables() {
        let (source, dest) = tables(20, 10, 5);
        let clock = ManualClock::new();
        let job = ReadJob::new("Src", RunSettings::default());

        let report = copy_table(&source, &dest, &clock, &job, "Dest").await.unwrap();

        assert_eq!((report.pages, report.items), (2, 20));
        assert_eq!(scans(&source), vec![(Some(10), Key::new()), (Some(10), key(10))]);
        assert_eq!(dest.items("Dest"), (1..=20).map(item).collect::<Vec<_>>());
        // 5 WCU -> 200 ms per write
        assert_eq!(clock.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_should_abort_copy_on_failed_write() {
        let (source, dest) = tables(20, 10, 5);
        dest.fail_put_at(7);
        let clock = ManualClock::new();
        let job = ReadJob::new("Src", RunSettings::default());

        let err = copy_table(&source, &dest, &clock, &job, "Dest")
            .await
            .unwrap_err();

        assert!(matches!(err, ArchiveError::Remote { .. }));
        assert_eq!(dest.items("Dest"), (1..=6).map(item).collect::<Vec<_>>());
        assert_eq!(dest.put_count(), 7);
    }

    #[tokio::test]
    async fn test_should_resume_copy_from_configured_key() {
        let (source, dest) = tables(20, 10, 5);
        let clock = ManualClock::new();
        let settings = RunSettings {
            start_key: Some(key(12)),
            ..RunSettings::default()
        };
        let job = ReadJob::new("Src", settings);

        let report = copy_table(&source, &dest, &clock, &job, "Dest").await.unwrap();

        assert_eq!(report.items, 8);
        assert_eq!(scans(&source)[0].1, key(12));
        assert_eq!(dest.items("Dest"), (13..=20).map(item).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_should_describe_destination_before_reading() {
        let (source, _) = tables(3, 10, 5);
        let dest = MemoryTableClient::new();
        let clock = ManualClock::new();
        let job = ReadJob::new("Src", RunSettings::default());

        assert!(copy_table(&source, &dest, &clock, &job, "Dest").await.is_err());
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_should_clamp_on_demand_source_to_quota() {
        let (source, dest) = tables(30, 0, 0);
        let clock = ManualClock::new();
        let settings = RunSettings {
            quota: 25,
            ..RunSettings::default()
        };
        let job = ReadJob::new("Src", settings);

        copy_table(&source, &dest, &clock, &job, "Dest").await.unwrap();

        let limits: Vec<_> = scans(&source).into_iter().map(|(l, _)| l).collect();
        assert_eq!(limits, vec![Some(25), Some(25)]);
        // 25 units -> 40 ms per item
        assert_eq!(clock.elapsed(), Duration::from_millis(1_200));
    }

    #[tokio::test]
    async fn test_should_slow_down_with_lower_rate() {
        let (source, dest) = tables(10, 10, 10);
        let clock = ManualClock::new();
        let settings = RunSettings {
            rate: 50,
            ..RunSettings::default()
        };
        let job = ReadJob::new("Src", settings);

        copy_table(&source, &dest, &clock, &job, "Dest").await.unwrap();

        // 10 units at 50 % -> 200 ms per item
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_should_archive_as_json_lines() {
        let (source, _) = tables(3, 10, 1);
        let clock = ManualClock::new();
        let job = ReadJob::new("Src", RunSettings::default());
        let mut out = Vec::new();

        let report = archive_table(&source, &clock, &job, &mut out).await.unwrap();

        assert_eq!(report.items, 3);
        let lines: Vec<Item> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines, (1..=3).map(item).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_should_take_top_items_across_pages() {
        let (source, _) = tables(50, 4, 1);
        let clock = ManualClock::new();
        let job = ReadJob::new("Src", RunSettings::default());
        let mut out = Vec::new();

        let report = top_items(&source, &clock, &job, 10, &mut out).await.unwrap();

        assert_eq!(report.items, 10);
        let limits: Vec<_> = scans(&source).into_iter().map(|(l, _)| l).collect();
        assert_eq!(limits, vec![Some(4), Some(4), Some(2)]);
        assert_eq!(report.last_evaluated_key, Some(key(10)));
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 10);
    }

    #[tokio::test]
    async fn test_should_take_top_items_in_one_page() {
        let (source, _) = tables(50, 100, 1);
        let clock = ManualClock::new();
        let job = ReadJob::new("Src", RunSettings::default());

        let report = top_items(&source, &clock, &job, 5, Vec::new()).await.unwrap();

        assert_eq!(report.pages, 1);
        assert_eq!(scans(&source), vec![(Some(5), Key::new())]);
    }

    #[tokio::test]
    async fn test_should_restore_paced_by_write_capacity() {
        let dest = MemoryTableClient::new();
        dest.add_table("Dest", "id", 1, 4);
        let clock = ManualClock::new();
        let mut archive = Vec::new();
        for n in 1..=4 {
            archive.extend(serde_json::to_vec(&item(n)).unwrap());
            archive.push(b'\n');
        }

        let report = restore_table(&archive[..], &dest, &clock, "Dest", &RunSettings::default())
            .await
            .unwrap();

        assert_eq!(report.items, 4);
        assert_eq!(dest.items("Dest").len(), 4);
        // 4 WCU -> 250 ms per item
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
    }
}
