//! The paginated, paced replication loop.
//!
//! One page is requested at a time. Every item of a page is forwarded to the
//! sink in the order received; when the sink writes to a remote table, each
//! write is awaited and then paced against the destination's write capacity.
//! After the page is drained the read side is paced against the source's
//! read capacity, and the next page is requested with the continuation key
//! the previous one returned. The loop ends on the first page without a
//! continuation key, or once an item cap is reached.

use dynarchive_model::input::{QueryInput, ScanInput};
use dynarchive_model::output::{QueryOutput, ScanOutput};
use dynarchive_model::types::{ConsumedCapacity, KeyConditions, ReturnConsumedCapacity};
use dynarchive_model::{Item, Key};
use tracing::{debug, info, warn};

use crate::client::TableClient;
use crate::error::ArchiveResult;
use crate::pacing::{Clock, Throttle};
use crate::sink::Sink;

/// How pages are read from the source, fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadMode {
    /// `Scan` the whole table.
    Scan,
    /// `Query` with legacy key conditions, passed through verbatim.
    Query(KeyConditions),
}

impl ReadMode {
    /// `Query` when key conditions are present, `Scan` otherwise.
    #[must_use]
    pub fn from_conditions(conditions: Option<KeyConditions>) -> Self {
        match conditions {
            Some(c) if !c.is_empty() => Self::Query(c),
            _ => Self::Scan,
        }
    }

    /// Name of the operation used for reads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scan => "Scan",
            Self::Query(_) => "Query",
        }
    }
}

/// Everything the loop needs to know about a run.
#[derive(Debug, Clone)]
pub struct ReplicationOptions {
    /// Source table.
    pub table_name: String,
    /// Secondary index of the source table to read instead of the base table.
    pub index_name: Option<String>,
    /// Scan or query.
    pub read_mode: ReadMode,
    /// `Limit` of each page request; zero is treated as one.
    pub page_limit: u64,
    /// Continuation key of a previous run.
    pub start_key: Option<Key>,
    /// Read-side pacing.
    pub read_msec_per_item: u64,
    /// Write-side pacing, applied only for remote sinks.
    pub write_msec_per_item: u64,
    /// Stop after this many items.
    pub max_items: Option<u64>,
}

impl ReplicationOptions {
    /// Unpaced, uncapped scan of `table_name`.
    pub fn scan(table_name: impl Into<String>, page_limit: u64) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: None,
            read_mode: ReadMode::Scan,
            page_limit,
            start_key: None,
            read_msec_per_item: 0,
            write_msec_per_item: 0,
            max_items: None,
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplicationReport {
    /// Page requests issued.
    pub pages: u64,
    /// Items forwarded to the sink.
    pub items: u64,
    /// Continuation key of the last page, if more items remain.
    pub last_evaluated_key: Option<Key>,
}

/// One page of a scan or query.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Items in source order.
    pub items: Vec<Item>,
    /// Where the next page starts; `None` on the last page.
    pub last_evaluated_key: Option<Key>,
    /// Capacity the read consumed, when reported.
    pub consumed_capacity: Option<ConsumedCapacity>,
}

impl From<ScanOutput> for Page {
    fn from(output: ScanOutput) -> Self {
        Self {
            items: output.items,
            last_evaluated_key: non_empty(output.last_evaluated_key),
            consumed_capacity: output.consumed_capacity,
        }
    }
}

impl From<QueryOutput> for Page {
    fn from(output: QueryOutput) -> Self {
        Self {
            items: output.items,
            last_evaluated_key: non_empty(output.last_evaluated_key),
            consumed_capacity: output.consumed_capacity,
        }
    }
}

fn non_empty(key: Key) -> Option<Key> {
    if key.is_empty() { None } else { Some(key) }
}

/// Drives pages from a source table into a [`Sink`].
#[derive(Debug)]
pub struct Replicator<'a, C: ?Sized, K: ?Sized> {
    source: &'a C,
    clock: &'a K,
    options: ReplicationOptions,
}

impl<'a, C, K> Replicator<'a, C, K>
where
    C: TableClient + ?Sized,
    K: Clock + ?Sized,
{
    /// Read from `source`, pacing with `clock`.
    pub fn new(source: &'a C, clock: &'a K, options: ReplicationOptions) -> Self {
        Self {
            source,
            clock,
            options,
        }
    }

    /// The options this replicator runs with.
    #[must_use]
    pub fn options(&self) -> &ReplicationOptions {
        &self.options
    }

    /// Run until the source is exhausted or the item cap is reached.
    ///
    /// Any read or sink failure ends the run immediately; the continuation
    /// key logged after the last completed page can be used to resume. The
    /// sink is finished on every path, so items it accepted before a failure
    /// are not lost.
    pub async fn run<S: Sink + ?Sized>(&self, sink: &mut S) -> ArchiveResult<ReplicationReport> {
        let opts = &self.options;
        let mut report = ReplicationReport::default();
        let outcome = self.drive(sink, &mut report).await;
        let finished = sink.finish().await;

        if let Err(err) = outcome {
            if let Err(flush) = finished {
                warn!(error = %flush, "failed to finish output after an error");
            }
            if err.is_throttled() {
                warn!(
                    table = %opts.table_name,
                    done = report.items,
                    "throttled by the service, resume from the last logged key with a lower rate"
                );
            }
            return Err(err);
        }
        finished?;

        info!(
            table = %opts.table_name,
            pages = report.pages,
            items = report.items,
            "replication finished"
        );
        Ok(report)
    }

    async fn drive<S: Sink + ?Sized>(
        &self,
        sink: &mut S,
        report: &mut ReplicationReport,
    ) -> ArchiveResult<()> {
        let opts = &self.options;
        let start = self.clock.now();
        let read_throttle = Throttle::new(start, opts.read_msec_per_item);
        let write_throttle = if sink.is_remote() {
            Throttle::new(start, opts.write_msec_per_item)
        } else {
            Throttle::disabled(start)
        };

        debug!(
            table = %opts.table_name,
            mode = opts.read_mode.as_str(),
            page_limit = opts.page_limit,
            read_msec_per_item = read_throttle.msec_per_item(),
            write_msec_per_item = write_throttle.msec_per_item(),
            resuming = opts.start_key.is_some(),
            "starting replication"
        );

        let mut next_key = opts.start_key.clone();

        loop {
            let limit = match opts.max_items {
                Some(max) if report.items >= max => break,
                Some(max) => opts.page_limit.max(1).min(max - report.items),
                None => opts.page_limit.max(1),
            };

            let page = self.fetch(next_key.take(), limit).await?;
            report.pages += 1;
            debug!(
                page = report.pages,
                items = page.items.len(),
                consumed = ?page.consumed_capacity.as_ref().and_then(|c| c.capacity_units),
                "page fetched"
            );

            for item in page.items {
                sink.accept(item).await?;
                report.items += 1;
                write_throttle.wait(self.clock, report.items).await;
            }
            read_throttle.wait(self.clock, report.items).await;

            report.last_evaluated_key.clone_from(&page.last_evaluated_key);
            let Some(key) = page.last_evaluated_key else {
                break;
            };
            info!(
                done = report.items,
                lastkey = %serde_json::to_string(&key)?,
                "continuing"
            );
            next_key = Some(key);
        }
        Ok(())
    }

    async fn fetch(&self, start_key: Option<Key>, limit: u64) -> ArchiveResult<Page> {
        let opts = &self.options;
        let limit = Some(i32::try_from(limit).unwrap_or(i32::MAX));
        let exclusive_start_key = start_key.unwrap_or_default();
        let page = match &opts.read_mode {
            ReadMode::Scan => self
                .source
                .scan(ScanInput {
                    table_name: opts.table_name.clone(),
                    index_name: opts.index_name.clone(),
                    limit,
                    exclusive_start_key,
                    return_consumed_capacity: Some(ReturnConsumedCapacity::None),
                })
                .await?
                .into(),
            ReadMode::Query(conditions) => self
                .source
                .query(QueryInput {
                    table_name: opts.table_name.clone(),
                    index_name: opts.index_name.clone(),
                    key_conditions: conditions.clone(),
                    limit,
                    exclusive_start_key,
                    return_consumed_capacity: Some(ReturnConsumedCapacity::None),
                })
                .await?
                .into(),
        };
        Ok(page)
    }
}
