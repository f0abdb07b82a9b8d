//! Monotonic time sources for probe timing

use std::sync::OnceLock;
use std::time::Instant;

/// A monotonic microsecond clock.
///
/// Collectors and timers read time exclusively through this trait, so hosts
/// (and tests) can substitute their own source. Implementations must be
/// non-decreasing; wall-clock-adjustable sources are not suitable.
pub trait TimeSource: Send + Sync + 'static {
    /// Microseconds elapsed since an arbitrary fixed origin.
    fn now_us(&self) -> u64;
}

/// Default time source backed by [`Instant`].
///
/// All instances share one process-wide epoch anchored at first use, so
/// readings from different collectors are directly comparable.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl TimeSource for MonotonicClock {
    #[inline]
    fn now_us(&self) -> u64 {
        process_epoch().elapsed().as_micros() as u64
    }
}

fn process_epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

/// Hand-driven clock for deterministic tests.
#[cfg(test)]
pub(crate) struct ManualClock {
    now_us: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            now_us: std::sync::atomic::AtomicU64::new(0),
        })
    }

    pub(crate) fn set_ms(&self, ms: u64) {
        self.now_us
            .store(ms * 1000, std::sync::atomic::Ordering::SeqCst);
    }

    pub(crate) fn advance_ms(&self, ms: u64) {
        self.now_us
            .fetch_add(ms * 1000, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl TimeSource for ManualClock {
    fn now_us(&self) -> u64 {
        self.now_us.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_is_non_decreasing() {
        let clock = MonotonicClock;
        let a = clock.now_us();
        let b = clock.now_us();
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_reports_set_time() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_us(), 0);
        clock.set_ms(5);
        assert_eq!(clock.now_us(), 5_000);
        clock.advance_ms(2);
        assert_eq!(clock.now_us(), 7_000);
    }
}
