//! Synthetic data used when the real dataset cannot be loaded.

use chrono::{Duration, NaiveDate};
use ymdash_types::{ChapterId, FeatureCounts, WeeklyChapterRecord};

use crate::aggregate::week_start;

pub const FALLBACK_WEEKS: usize = 52;
/// Chapter ID carried by synthetic rows.
pub const FALLBACK_CHAPTER: ChapterId = ChapterId(0);

/// A deterministic 52-week series ending in the week containing `through`.
///
/// Values follow a smooth seasonal curve so the timeline has something to
/// brush; the same `through` always yields the same rows.
pub fn fallback_weekly(through: NaiveDate) -> Vec<WeeklyChapterRecord> {
    let last = week_start(through);
    let first = last - Duration::weeks(FALLBACK_WEEKS as i64 - 1);

    (0..FALLBACK_WEEKS)
        .map(|i| {
            let phase = i as f64 / FALLBACK_WEEKS as f64 * std::f64::consts::TAU;
            let all_feats = (50.0 + 40.0 * phase.sin()).round() as i64;
            let buildings = all_feats * 6 / 10;
            let highways = all_feats / 4;
            let amenities = all_feats / 20;
            WeeklyChapterRecord {
                week: first + Duration::weeks(i as i64),
                chapter_id: FALLBACK_CHAPTER,
                counts: FeatureCounts::derived(all_feats, buildings, highways, amenities),
                mappers: 1 + (i as i64 % 5),
            }
        })
        .collect()
}
