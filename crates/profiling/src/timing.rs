//! Scope timing guards that feed samples into collectors

use crate::collector::Collector;

/// Times one block of code and records the result on every exit path.
///
/// The guard stamps its start time from the collector's clock when created
/// and records `(start, now - start)` into the collector exactly once when
/// dropped, whether the region exits normally, returns early, or unwinds.
/// Recording can neither fail nor panic, so instrumenting a region never
/// changes its behavior.
///
/// # Example
///
/// ```rust
/// use profiling::{Collector, ScopedTimer};
///
/// let collector = Collector::new("save_document");
///
/// fn save(collector: &profiling::Collector) {
///     let _timer = ScopedTimer::new(collector);
///     // ... measured work ...
/// } // records here
/// # save(&collector);
/// ```
pub struct ScopedTimer<'a> {
    collector: &'a Collector,
    start_us: u64,
}

impl<'a> ScopedTimer<'a> {
    /// Start timing against the given collector.
    #[inline]
    pub fn new(collector: &'a Collector) -> Self {
        Self {
            collector,
            start_us: collector.now_us(),
        }
    }

    /// Start timestamp in the collector's clock domain.
    #[inline]
    pub fn start_us(&self) -> u64 {
        self.start_us
    }

    /// Microseconds elapsed since the timer started.
    #[inline]
    pub fn elapsed_us(&self) -> u64 {
        self.collector.now_us().saturating_sub(self.start_us)
    }

    /// Consume the timer and return the elapsed time without recording it.
    #[inline]
    pub fn stop(self) -> u64 {
        let elapsed = self.elapsed_us();
        std::mem::forget(self); // skip the drop-time record
        elapsed
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        let duration_us = self.collector.now_us().saturating_sub(self.start_us);
        self.collector.record(self.start_us, duration_us);
    }
}

/// Time the rest of the enclosing scope under a named probe point.
///
/// Declares a function-scoped static [`Collector`] (created and registered
/// on first execution, alive for the rest of the process) and a
/// [`ScopedTimer`] bound to it. This is the one-liner form for permanent
/// probe points:
///
/// ```rust
/// fn handle_keypress() {
///     profiling::time_scope!("handle_keypress");
///     // ... measured work ...
/// }
/// # handle_keypress();
/// ```
#[macro_export]
macro_rules! time_scope {
    ($name:expr) => {
        let _scope_timer = {
            static SCOPE_COLLECTOR: ::std::sync::OnceLock<::std::sync::Arc<$crate::Collector>> =
                ::std::sync::OnceLock::new();
            $crate::ScopedTimer::new(SCOPE_COLLECTOR.get_or_init(|| $crate::Collector::new($name)))
        };
    };
}
