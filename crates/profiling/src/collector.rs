//! Ring-buffered sample collectors with sliding-window aggregation

use crate::clock::{MonotonicClock, TimeSource};
use crate::registry::{registry, CollectorHandle};
use crate::stats::BucketStats;
use std::sync::{Arc, Mutex, OnceLock};

/// Ring geometry for a [`Collector`].
///
/// `slot_duration_ms` is the width of one bucket and `num_slots` the number
/// of buckets retained, so a collector remembers roughly
/// `slot_duration_ms * num_slots` milliseconds of history. Both are fixed
/// for the lifetime of a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingConfig {
    /// Width of one bucket in milliseconds (at least 1)
    pub slot_duration_ms: u64,
    /// Number of buckets retained, including the in-progress one (at least 2)
    pub num_slots: usize,
}

impl RingConfig {
    /// Default bucket width: one second.
    pub const DEFAULT_SLOT_DURATION_MS: u64 = 1000;

    /// Default ring length: 60 completed buckets plus the in-progress one,
    /// enough to answer queries up to a minute back.
    pub const DEFAULT_NUM_SLOTS: usize = 61;

    /// Create a config, clamping to the minimum usable geometry
    /// (1 ms buckets, 2 slots).
    pub fn new(slot_duration_ms: u64, num_slots: usize) -> Self {
        Self {
            slot_duration_ms: slot_duration_ms.max(1),
            num_slots: num_slots.max(2),
        }
    }

    /// Builder method to set the bucket width.
    pub fn with_slot_duration_ms(mut self, ms: u64) -> Self {
        self.slot_duration_ms = ms.max(1);
        self
    }

    /// Builder method to set the ring length.
    pub fn with_num_slots(mut self, slots: usize) -> Self {
        self.num_slots = slots.max(2);
        self
    }

    /// Bucket width in microseconds, the unit samples are timestamped in.
    #[inline]
    pub(crate) fn slot_us(&self) -> u64 {
        self.slot_duration_ms.saturating_mul(1000)
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SLOT_DURATION_MS, Self::DEFAULT_NUM_SLOTS)
    }
}

/// Bucket storage. `buckets[0]` covers the bucket containing `head_bucket`;
/// `buckets[i]` is `i` buckets older.
struct Ring {
    buckets: Vec<BucketStats>,
    head_bucket: u64,
}

impl Ring {
    fn new(num_slots: usize, head_bucket: u64) -> Self {
        Self {
            buckets: vec![BucketStats::default(); num_slots],
            head_bucket,
        }
    }

    /// Slide the ring forward so `buckets[0]` covers `now_bucket`.
    ///
    /// Contents move towards the old end and whatever falls off the back is
    /// discarded. A gap of a full ring length or more empties everything.
    /// `now_bucket` values behind the head are treated as "no time passed";
    /// the clock is assumed monotonic.
    fn advance_to(&mut self, now_bucket: u64) {
        if now_bucket <= self.head_bucket {
            return;
        }
        let shift = now_bucket - self.head_bucket;
        let len = self.buckets.len();
        if shift >= len as u64 {
            self.reset();
        } else {
            let shift = shift as usize;
            self.buckets.copy_within(..len - shift, shift);
            for bucket in &mut self.buckets[..shift] {
                bucket.reset();
            }
        }
        self.head_bucket = now_bucket;
    }

    fn reset(&mut self) {
        for bucket in &mut self.buckets {
            bucket.reset();
        }
    }
}

/// A named aggregation point for elapsed-time samples.
///
/// Each collector owns a fixed ring of [`BucketStats`] buckets and slides it
/// forward as samples arrive, so queries over recent windows stay O(window)
/// regardless of sample volume. Collectors register themselves with the
/// process-wide [`registry()`](crate::registry()) on construction and
/// unregister when dropped.
///
/// Probe points are usually long-lived: create the collector once (commonly
/// through [`time_scope!`](crate::time_scope)) and feed it from a
/// [`ScopedTimer`](crate::ScopedTimer) per measured region.
pub struct Collector {
    name: String,
    config: RingConfig,
    clock: Arc<dyn TimeSource>,
    ring: Mutex<Ring>,
    handle: OnceLock<CollectorHandle>,
}

impl Collector {
    /// Create a collector with the default ring geometry and clock, and
    /// register it with the process-wide registry.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_config(name, RingConfig::default())
    }

    /// Create a collector with a custom ring geometry.
    pub fn with_config(name: impl Into<String>, config: RingConfig) -> Arc<Self> {
        Self::with_clock(name, config, Arc::new(MonotonicClock))
    }

    /// Create a collector reading time from a caller-supplied source.
    pub fn with_clock(
        name: impl Into<String>,
        config: RingConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Arc<Self> {
        let head_bucket = clock.now_us() / config.slot_us();
        let collector = Arc::new(Self {
            name: name.into(),
            config,
            clock,
            ring: Mutex::new(Ring::new(config.num_slots, head_bucket)),
            handle: OnceLock::new(),
        });
        let handle = registry().register(&collector);
        let _ = collector.handle.set(handle);
        collector
    }

    /// Display name of this probe point. Uniqueness is not enforced.
    #[inline]
    pub fn get_key(&self) -> &str {
        &self.name
    }

    /// The ring geometry this collector was built with.
    #[inline]
    pub fn config(&self) -> RingConfig {
        self.config
    }

    /// Current reading of this collector's clock in microseconds.
    ///
    /// Callers invoking [`record`](Self::record) directly should take their
    /// start timestamps from here so they share the collector's clock domain.
    #[inline]
    pub fn now_us(&self) -> u64 {
        self.clock.now_us()
    }

    /// Record one sample: a region that started at `start_us` (in this
    /// collector's clock domain) and ran for `duration_us`.
    ///
    /// Samples whose start falls outside the retained window, or apparently
    /// ahead of the clock, are dropped silently.
    #[cfg(feature = "telemetry")]
    pub fn record(&self, start_us: u64, duration_us: u64) {
        let slot_us = self.config.slot_us();
        let now_bucket = self.clock.now_us() / slot_us;
        if let Ok(mut ring) = self.ring.lock() {
            ring.advance_to(now_bucket);
            let sample_bucket = start_us / slot_us;
            if sample_bucket <= ring.head_bucket {
                let slot = (ring.head_bucket - sample_bucket) as usize;
                if slot < self.config.num_slots {
                    ring.buckets[slot].record(duration_us);
                    tracing::trace!(
                        target: "profiling::collector",
                        name = %self.name,
                        start_us,
                        duration_us,
                        "sample recorded"
                    );
                }
            }
        }
    }

    /// Record a sample (no-op when telemetry is disabled).
    #[cfg(not(feature = "telemetry"))]
    #[inline]
    pub fn record(&self, _start_us: u64, _duration_us: u64) {}

    /// Merge the completed buckets covering the most recent `window_ms`
    /// milliseconds into one summary.
    ///
    /// The in-progress bucket is always excluded: its time window has not
    /// elapsed yet, so a partial sample set there would skew min/max/average
    /// against fully-elapsed buckets. A window narrower than one bucket
    /// therefore yields the empty summary. Windows longer than the retained
    /// history are capped at the ring length.
    pub fn accumulate(&self, window_ms: u64) -> BucketStats {
        let mut acc = BucketStats::default();
        if let Ok(ring) = self.ring.lock() {
            let span = (window_ms / self.config.slot_duration_ms)
                .min(self.config.num_slots as u64) as usize;
            let end = (span + 1).min(self.config.num_slots);
            for bucket in &ring.buckets[1..end] {
                acc.merge(bucket);
            }
        }
        acc
    }

    /// Clear every bucket without moving the ring's position.
    pub fn reset(&self) {
        if let Ok(mut ring) = self.ring.lock() {
            ring.reset();
        }
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        if let Some(&handle) = self.handle.get() {
            registry().unregister(handle);
        }
    }
}
