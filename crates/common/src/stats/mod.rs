//! # Bucket statistics
//!
//! Object stores keep no per-bucket totals, so size and object count are
//! computed by walking the full object listing. A huge or slow bucket must
//! not hold up a dashboard, so every walk runs under a wall-clock budget:
//!
//! - [`scan`] reduces one bucket to a [`BucketUsage`], or to
//!   [`BucketUsage::UNKNOWN`] when the budget runs out
//! - [`aggregate`] scans many buckets with bounded concurrency and folds the
//!   results into a [`UsageSummary`], leaving unknown buckets out of the sums
//!
//! Nothing is cached; every call rescans.

mod aggregate;
mod scanner;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use aggregate::{aggregate, bucket_stats, unknown_stats};
pub use scanner::scan;

/// Budget for authoritative listings such as the bucket page
pub const FULL_SCAN_BUDGET: Duration = Duration::from_secs(30);
/// Budget for dashboard summaries
pub const QUICK_SCAN_BUDGET: Duration = Duration::from_secs(5);

/// Size and object count of one bucket.
///
/// `(-1, -1)` is reserved for "could not be computed" and is distinct from
/// `(0, 0)`, an empty bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketUsage {
    pub size_bytes: i64,
    pub object_count: i64,
}

impl BucketUsage {
    pub const UNKNOWN: BucketUsage = BucketUsage {
        size_bytes: -1,
        object_count: -1,
    };

    pub const EMPTY: BucketUsage = BucketUsage {
        size_bytes: 0,
        object_count: 0,
    };

    pub fn new(size_bytes: i64, object_count: i64) -> Self {
        Self {
            size_bytes,
            object_count,
        }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    pub(crate) fn record_object(&mut self, size: u64) {
        let size = i64::try_from(size).unwrap_or(i64::MAX);
        self.size_bytes = self.size_bytes.saturating_add(size);
        self.object_count = self.object_count.saturating_add(1);
    }
}

/// Usage of a named bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketStat {
    pub bucket_name: String,
    pub usage: BucketUsage,
}

impl BucketStat {
    pub fn new(bucket_name: impl Into<String>, usage: BucketUsage) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            usage,
        }
    }
}

/// Totals over a set of buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub total_size_bytes: i64,
    pub total_object_count: i64,
    /// Every bucket, with or without stats
    pub total_buckets: usize,
    /// Buckets whose scan finished in time
    pub buckets_with_stats: usize,
}

impl UsageSummary {
    /// Fold per-bucket results, skipping unknown entries.
    ///
    /// Unknown buckets still count towards `total_buckets`.
    pub fn from_stats<'a>(stats: impl IntoIterator<Item = &'a BucketStat>) -> Self {
        stats.into_iter().fold(Self::default(), |mut summary, stat| {
            summary.total_buckets += 1;
            if !stat.usage.is_unknown() {
                summary.total_size_bytes = summary.total_size_bytes.saturating_add(stat.usage.size_bytes);
                summary.total_object_count =
                    summary.total_object_count.saturating_add(stat.usage.object_count);
                summary.buckets_with_stats += 1;
            }
            summary
        })
    }

    /// Buckets that produced no stats.
    pub fn buckets_without_stats(&self) -> usize {
        self.total_buckets - self.buckets_with_stats
    }
}

/// The parent request went away while a scan was running.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("scan of bucket '{bucket}' cancelled")]
pub struct ScanCancelled {
    pub bucket: String,
}

/// Human readable size with binary units, `N/A` for unknown sizes.
pub fn format_bytes(bytes: i64) -> String {
    const UNIT: i64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < 0 {
        return "N/A".to_string();
    }
    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT && exp < PREFIXES.len() - 1 {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}B", bytes as f64 / div as f64, PREFIXES[exp])
}
