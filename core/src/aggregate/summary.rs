//! Summary statistics for the chapter statistics panel.

use serde::Serialize;
use ymdash_types::{AggregatedBucket, FeatureCounts};

/// One slice of the feature-type distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: &'static str,
    pub value: i64,
    /// Fraction of the summed categories, 0.0..=1.0
    pub share: f64,
}

/// Totals and headline numbers over a bucket sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub totals: FeatureCounts,
    /// Buckets with any activity
    pub active_weeks: usize,
    pub avg_weekly_activity: i64,
    pub peak_mappers: i64,
    pub distribution: Vec<CategoryShare>,
}

/// Summarize aggregated buckets. Returns `None` for an empty sequence.
pub fn summarize(buckets: &[AggregatedBucket]) -> Option<ActivitySummary> {
    if buckets.is_empty() {
        return None;
    }

    let mut totals = FeatureCounts::default();
    for bucket in buckets {
        totals.add(&bucket.counts());
    }

    let active_weeks = buckets.iter().filter(|b| b.all_feats > 0).count();
    let avg_weekly_activity = if active_weeks > 0 {
        (totals.all_feats as f64 / active_weeks as f64).round() as i64
    } else {
        0
    };
    let peak_mappers = buckets.iter().map(|b| b.mappers).max().unwrap_or(0);

    Some(ActivitySummary {
        totals,
        active_weeks,
        avg_weekly_activity,
        peak_mappers,
        distribution: distribution(&totals),
    })
}

fn distribution(totals: &FeatureCounts) -> Vec<CategoryShare> {
    let categories = [
        ("Buildings", totals.buildings),
        ("Highways", totals.highways),
        ("Amenities", totals.amenities),
        ("Other", totals.other),
    ];
    let sum = categories
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| *v > 0)
        .fold(0i64, i64::saturating_add);

    categories
        .into_iter()
        .filter(|(_, value)| *value > 0)
        .map(|(name, value)| CategoryShare {
            name,
            value,
            share: value as f64 / sum as f64,
        })
        .collect()
}
