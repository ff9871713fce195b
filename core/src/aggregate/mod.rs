//! Temporal aggregation of weekly chapter activity.
//!
//! Rolls [`WeeklyChapterRecord`]s into one [`AggregatedBucket`] per distinct
//! bucket start, restricted to the selected chapters, and smooths `all_feats`
//! with a trailing rolling mean for the timeline curve.

mod bucketing;
mod summary;

#[cfg(test)]
mod aggregate_tests;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use hashbrown::HashSet;

pub use bucketing::{bucket_activity, week_start};
pub use summary::{ActivitySummary, CategoryShare, summarize};
pub use ymdash_types::{AggregatedBucket, ChapterSet, FeatureCounts, WeeklyChapterRecord};

/// Default trailing window of the rolling average, in buckets.
pub const DEFAULT_ROLLING_WINDOW: usize = 4;

#[derive(Default)]
struct BucketAccumulator {
    counts: FeatureCounts,
    mappers: i64,
    chapters: HashSet<i64>,
}

/// Group records by bucket start and sum every field across the chapters
/// admitted by `chapter_filter` (an empty filter admits all chapters).
///
/// Bucket spacing is taken from the data; no cadence is assumed.
pub fn aggregate(
    records: &[WeeklyChapterRecord],
    chapter_filter: &ChapterSet,
    window: usize,
) -> Vec<AggregatedBucket> {
    let mut grouped: BTreeMap<NaiveDate, BucketAccumulator> = BTreeMap::new();

    for record in records
        .iter()
        .filter(|r| chapter_filter.admits(r.chapter_id))
    {
        let acc = grouped.entry(record.week).or_default();
        acc.counts.add(&record.counts);
        acc.mappers = acc.mappers.saturating_add(record.mappers);
        acc.chapters.insert(record.chapter_id.value());
    }

    let totals: Vec<i64> = grouped.values().map(|acc| acc.counts.all_feats).collect();
    let rolling = rolling_mean(&totals, window);

    grouped
        .into_iter()
        .zip(rolling)
        .map(|((bucket_start, acc), rolling_value)| AggregatedBucket {
            bucket_start,
            all_feats: acc.counts.all_feats,
            buildings: acc.counts.buildings,
            highways: acc.counts.highways,
            amenities: acc.counts.amenities,
            other: acc.counts.other,
            mappers: acc.mappers,
            chapter_count: acc.chapters.len(),
            rolling_value,
        })
        .collect()
}

/// Trailing mean over at most `window` values ending at each index.
///
/// The window shrinks at the start of the series instead of padding with
/// zeros, and never looks past the current index.
pub fn rolling_mean(values: &[i64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    // A window of i64 values cannot overflow i128
    let mut running: i128 = 0;

    for (i, &value) in values.iter().enumerate() {
        running += i128::from(value);
        if i >= window {
            running -= i128::from(values[i - window]);
        }
        let len = (i + 1).min(window);
        out.push(running as f64 / len as f64);
    }
    out
}

/// Lazily recomputed aggregation over a fixed record set.
///
/// The result is cached for the current chapter filter; changing the filter
/// marks the cache dirty and the next [`TemporalAggregator::buckets`] call
/// recomputes it in full.
#[derive(Debug, Clone)]
pub struct TemporalAggregator {
    records: Vec<WeeklyChapterRecord>,
    window: usize,
    filter: ChapterSet,
    cached: Option<Vec<AggregatedBucket>>,
}

impl Default for TemporalAggregator {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_ROLLING_WINDOW)
    }
}

impl TemporalAggregator {
    pub fn new(records: Vec<WeeklyChapterRecord>, window: usize) -> Self {
        Self {
            records,
            window,
            filter: ChapterSet::new(),
            cached: None,
        }
    }

    pub fn records(&self) -> &[WeeklyChapterRecord] {
        &self.records
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn filter(&self) -> &ChapterSet {
        &self.filter
    }

    /// Replace the input records; the next read recomputes.
    pub fn set_records(&mut self, records: Vec<WeeklyChapterRecord>) {
        self.records = records;
        self.cached = None;
    }

    /// Returns true if the filter changed and a recompute is pending.
    pub fn set_chapter_filter(&mut self, filter: ChapterSet) -> bool {
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.cached = None;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.cached.is_none()
    }

    /// Aggregated buckets for the current filter.
    pub fn buckets(&mut self) -> &[AggregatedBucket] {
        if self.cached.is_none() {
            let buckets = aggregate(&self.records, &self.filter, self.window);
            tracing::debug!(
                records = self.records.len(),
                chapters = self.filter.len(),
                buckets = buckets.len(),
                "Recomputed activity buckets"
            );
            self.cached = Some(buckets);
        }
        self.cached.as_deref().unwrap_or_default()
    }
}
