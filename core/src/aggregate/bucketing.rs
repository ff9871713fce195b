//! Raw event bucketing into weekly chapter rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate};
use ymdash_types::{ActivityRecord, ChapterId, FeatureCounts, WeeklyChapterRecord};

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Roll raw events into one row per (week, chapter), weeks starting Monday UTC.
///
/// Raw events carry no mapper identity, so `mappers` is 0 on every row.
/// Events with an out-of-range timestamp are dropped.
pub fn bucket_activity(records: &[ActivityRecord]) -> Vec<WeeklyChapterRecord> {
    let mut grouped: BTreeMap<(NaiveDate, ChapterId), FeatureCounts> = BTreeMap::new();

    for record in records {
        let Some(at) = DateTime::from_timestamp(record.timestamp, 0) else {
            tracing::warn!(timestamp = record.timestamp, "Dropping event with invalid timestamp");
            continue;
        };
        let week = week_start(at.date_naive());
        grouped
            .entry((week, record.chapter_id))
            .or_default()
            .add(&record.counts);
    }

    grouped
        .into_iter()
        .map(|((week, chapter_id), counts)| WeeklyChapterRecord {
            week,
            chapter_id,
            counts,
            mappers: 0,
        })
        .collect()
}
