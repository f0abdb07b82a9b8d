//! Mergeable min/max/total/count summaries for one time bucket

use serde::{Deserialize, Serialize};

/// Aggregated timing statistics for a single time bucket.
///
/// All fields are microseconds except `count`. A value with `count == 0` is
/// the empty summary; its other fields are meaningless and ignored by
/// [`merge`](Self::merge). Merging is commutative and associative, so any
/// number of buckets can be combined in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStats {
    /// Shortest recorded duration in microseconds
    pub min_us: u64,
    /// Longest recorded duration in microseconds
    pub max_us: u64,
    /// Sum of all recorded durations in microseconds
    pub total_us: u64,
    /// Number of samples recorded
    pub count: u64,
}

impl BucketStats {
    /// Clear back to the empty summary.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold one sample duration into the summary.
    pub fn record(&mut self, duration_us: u64) {
        if self.count == 0 {
            self.min_us = duration_us;
            self.max_us = duration_us;
            self.total_us = duration_us;
        } else {
            self.min_us = self.min_us.min(duration_us);
            self.max_us = self.max_us.max(duration_us);
            self.total_us += duration_us;
        }
        self.count += 1;
    }

    /// Fold another summary into this one.
    ///
    /// Merging the empty summary (in either direction) leaves the other
    /// operand unchanged.
    pub fn merge(&mut self, other: &BucketStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            self.min_us = other.min_us;
            self.max_us = other.max_us;
        } else {
            self.min_us = self.min_us.min(other.min_us);
            self.max_us = self.max_us.max(other.max_us);
        }
        self.total_us += other.total_us;
        self.count += other.count;
    }

    /// Mean duration in microseconds, truncated. Zero when empty.
    #[inline]
    pub fn average_us(&self) -> u64 {
        if self.count > 0 {
            self.total_us / self.count
        } else {
            0
        }
    }

    /// Whether any samples have been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stats_from(durations: &[u64]) -> BucketStats {
        let mut stats = BucketStats::default();
        for &d in durations {
            stats.record(d);
        }
        stats
    }

    #[test]
    fn first_sample_sets_every_field() {
        let stats = stats_from(&[42]);
        assert_eq!(stats.min_us, 42);
        assert_eq!(stats.max_us, 42);
        assert_eq!(stats.total_us, 42);
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn record_tracks_min_max_and_total() {
        let stats = stats_from(&[10, 3, 7]);
        assert_eq!(stats.min_us, 3);
        assert_eq!(stats.max_us, 10);
        assert_eq!(stats.total_us, 20);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn zero_duration_samples_are_counted() {
        let stats = stats_from(&[0, 0]);
        assert_eq!(stats.min_us, 0);
        assert_eq!(stats.max_us, 0);
        assert_eq!(stats.count, 2);
        assert!(!stats.is_empty());
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let full = stats_from(&[5, 9]);

        let mut left = full;
        left.merge(&BucketStats::default());
        assert_eq!(left, full);

        let mut right = BucketStats::default();
        right.merge(&full);
        assert_eq!(right, full);
    }

    #[test]
    fn average_truncates() {
        let stats = stats_from(&[1, 2, 2]);
        assert_eq!(stats.average_us(), 1);
    }

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(BucketStats::default().average_us(), 0);
    }

    #[test]
    fn reset_returns_to_empty() {
        let mut stats = stats_from(&[100]);
        stats.reset();
        assert_eq!(stats, BucketStats::default());
        assert!(stats.is_empty());
    }

    #[test]
    fn serializes_to_camel_case() {
        let stats = stats_from(&[8]);
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["minUs"], 8);
        assert_eq!(json["maxUs"], 8);
        assert_eq!(json["totalUs"], 8);
        assert_eq!(json["count"], 1);
    }

    fn durations() -> impl Strategy<Value = Vec<u64>> {
        proptest::collection::vec(0u64..1_000_000, 0..32)
    }

    proptest! {
        #[test]
        fn merge_is_commutative(a in durations(), b in durations()) {
            let (sa, sb) = (stats_from(&a), stats_from(&b));

            let mut ab = sa;
            ab.merge(&sb);
            let mut ba = sb;
            ba.merge(&sa);

            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn merge_is_associative(a in durations(), b in durations(), c in durations()) {
            let (sa, sb, sc) = (stats_from(&a), stats_from(&b), stats_from(&c));

            let mut left = sa;
            left.merge(&sb);
            left.merge(&sc);

            let mut bc = sb;
            bc.merge(&sc);
            let mut right = sa;
            right.merge(&bc);

            prop_assert_eq!(left, right);
        }

        #[test]
        fn average_lies_between_min_and_max(d in proptest::collection::vec(0u64..1_000_000, 1..32)) {
            let stats = stats_from(&d);
            prop_assert!(stats.min_us <= stats.average_us());
            prop_assert!(stats.average_us() <= stats.max_us);
        }
    }
}
