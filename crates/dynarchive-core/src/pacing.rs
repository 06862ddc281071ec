//! Pacing: turning provisioned capacity into per-item delays.
//!
//! Every side of a run (reads from the source, writes to the destination) is
//! paced independently. A side with `msec_per_item = m` that has processed
//! `done` items may not proceed before `start + m * done`; the loop sleeps
//! until that deadline. The delay is derived once per run and never adapted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Capacity bound used when no quota is configured.
pub const DEFAULT_QUOTA: u64 = 100;

/// Throughput percentage used when no rate is configured.
pub const DEFAULT_RATE: u64 = 100;

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Capacity actually used for pacing.
///
/// A table without provisioned capacity (on-demand, reported as zero) or one
/// above the quota is paced at the quota. A zero quota counts as one.
#[must_use]
pub fn effective_capacity(capacity: u64, quota: u64) -> u64 {
    let quota = quota.max(1);
    if capacity == 0 || capacity > quota {
        quota
    } else {
        capacity
    }
}

/// Milliseconds per item for a capacity clamped to `quota`.
#[must_use]
pub fn msec_per_item(capacity: u64, quota: u64) -> u64 {
    round_div(1000, effective_capacity(capacity, quota))
}

/// Milliseconds per item when only `rate` percent of `limit` items per
/// second may be used: `round(1000 / limit / (rate / 100))`.
///
/// Returns zero (no throttling) when either input is zero.
#[must_use]
pub fn rate_scaled_msec_per_item(limit: u64, rate: u64) -> u64 {
    round_div(100_000, limit.saturating_mul(rate))
}

/// Milliseconds per item for one side of a run: the capacity is clamped to
/// the quota, then `rate` percent of it is used.
#[must_use]
pub fn side_msec_per_item(capacity: u64, quota: u64, rate: u64) -> u64 {
    rate_scaled_msec_per_item(effective_capacity(capacity, quota), rate)
}

/// Round-half-up integer division; zero divisor yields zero.
fn round_div(numerator: u64, divisor: u64) -> u64 {
    if divisor == 0 {
        return 0;
    }
    numerator.saturating_mul(2).saturating_add(divisor) / divisor.saturating_mul(2)
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of time for pacing.
///
/// The replication loop only ever suspends through [`Clock::sleep_until`],
/// so tests can substitute a clock that advances without sleeping.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend until `deadline` has passed.
    async fn sleep_until(&self, deadline: Instant);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}

/// Virtual clock that jumps to each deadline instead of sleeping.
///
/// Every sleep is recorded as the offset of its deadline from the clock's
/// origin, which makes pacing observable in tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    inner: Arc<Mutex<ManualClockState>>,
}

#[derive(Debug)]
struct ManualClockState {
    now: Instant,
    sleeps: Vec<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a clock starting at the current instant.
    #[must_use]
    pub fn new() -> Self {
        let origin = Instant::now();
        Self {
            origin,
            inner: Arc::new(Mutex::new(ManualClockState {
                now: origin,
                sleeps: Vec::new(),
            })),
        }
    }

    /// Move the clock forward, as if work took `by`.
    pub fn advance(&self, by: Duration) {
        self.inner.lock().now += by;
    }

    /// Time elapsed since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.inner.lock().now - self.origin
    }

    /// Deadlines slept until, as offsets from the origin.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.lock().sleeps.clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.inner.lock().now
    }

    async fn sleep_until(&self, deadline: Instant) {
        let mut state = self.inner.lock();
        if deadline > state.now {
            state.now = deadline;
        }
        state.sleeps.push(deadline - self.origin);
    }
}

// ---------------------------------------------------------------------------
// Throttle
// ---------------------------------------------------------------------------

/// Pacing state for one side of a run.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    start: Instant,
    msec_per_item: u64,
}

impl Throttle {
    /// Start pacing at `start` with a fixed per-item delay.
    #[must_use]
    pub fn new(start: Instant, msec_per_item: u64) -> Self {
        Self {
            start,
            msec_per_item,
        }
    }

    /// A throttle that never waits.
    #[must_use]
    pub fn disabled(start: Instant) -> Self {
        Self::new(start, 0)
    }

    /// Per-item delay in milliseconds.
    #[must_use]
    pub fn msec_per_item(&self) -> u64 {
        self.msec_per_item
    }

    /// Earliest instant the next operation may start after `done` items, or
    /// `None` when throttling is disabled.
    #[must_use]
    pub fn deadline(&self, done: u64) -> Option<Instant> {
        if self.msec_per_item == 0 {
            return None;
        }
        let offset = Duration::from_millis(self.msec_per_item.saturating_mul(done));
        Some(self.start + offset)
    }

    /// Wait until the deadline for `done` items has passed.
    ///
    /// Returns how long the caller was held back.
    pub async fn wait<K: Clock + ?Sized>(&self, clock: &K, done: u64) -> Duration {
        let Some(deadline) = self.deadline(done) else {
            return Duration::ZERO;
        };
        let now = clock.now();
        if deadline <= now {
            return Duration::ZERO;
        }
        let wait = deadline - now;
        trace!(done, ?wait, "pacing");
        clock.sleep_until(deadline).await;
        wait
    }
}
