//! In-Process Profiling Counters
//!
//! This crate provides lightweight timing instrumentation for hot paths:
//! - Named probe points that aggregate elapsed-time samples into a sliding
//!   window of fixed-width time buckets (min/max/average/count)
//! - A process-wide registry a reporting layer can poll to enumerate live
//!   probe points and reset them on request
//! - RAII scope timing that records on every exit path and can never
//!   disturb the code it measures
//!
//! # Feature Flags
//!
//! - `telemetry` (default): Enables sample collection. When disabled,
//!   recording compiles down to a no-op while probe points remain valid.
//!
//! # Example
//!
//! ```rust
//! use profiling::{registry, Collector, ScopedTimer};
//!
//! fn rebuild_layout(collector: &profiling::Collector) {
//!     let _timer = ScopedTimer::new(collector);
//!     // ... measured work ...
//! }
//!
//! let collector = Collector::new("rebuild_layout");
//! rebuild_layout(&collector);
//!
//! // A reporting pass, typically on its own timer:
//! for probe in registry().list() {
//!     let recent = probe.accumulate(5_000);
//!     println!("{}: {} samples, avg {} us", probe.get_key(), recent.count, recent.average_us());
//! }
//! ```
//!
//! # Key Types
//!
//! - [`BucketStats`] - Mergeable per-bucket summaries
//! - [`Collector`] and [`RingConfig`] - Ring-buffered collectors and their geometry
//! - [`Registry`] and [`registry()`] - Process-wide enumeration of live collectors
//! - [`ScopedTimer`] and [`time_scope!`] - Scope timing guards
//! - [`TimeSource`] and [`MonotonicClock`] - Injected monotonic time sources

mod clock;
mod collector;
mod registry;
mod stats;
mod timing;

pub use clock::*;
pub use collector::*;
pub use registry::*;
pub use stats::*;
pub use timing::*;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn samples_flow_from_timer_to_report() {
        let clock = ManualClock::new();
        let collector = Collector::with_clock(
            "integration_flow",
            RingConfig::new(1000, 5),
            clock.clone(),
        );

        for _ in 0..4 {
            let _timer = ScopedTimer::new(&collector);
            clock.advance_ms(2);
        }

        // Complete the bucket the samples landed in.
        clock.set_ms(1000);
        collector.record(1_000_000, 1);

        let reported: Vec<(String, BucketStats)> = registry()
            .list()
            .iter()
            .filter(|c| c.get_key() == "integration_flow")
            .map(|c| (c.get_key().to_string(), c.accumulate(4_000)))
            .collect();

        assert_eq!(reported.len(), 1);
        let (_, stats) = &reported[0];
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min_us, 2_000);
        assert_eq!(stats.max_us, 2_000);
        assert_eq!(stats.average_us(), 2_000);

        drop(collector);
        assert!(!registry()
            .list()
            .iter()
            .any(|c| c.get_key() == "integration_flow"));
    }
}
