//! Raw activity event CSV.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use ymdash_types::{ActivityRecord, ChapterId, FeatureCounts};

use super::columns::{ColumnIndex, RowError, field, parse_count, parse_timestamp};
use super::error::LoadError;
use super::{DataOrigin, LoadReport, WeeklyDataset};
use crate::aggregate::bucket_activity;

/// Parse raw events (`timestamp,chapter_id,all_feats,buildings,highways,amenities[,other]`).
/// Malformed rows are skipped and counted.
pub fn parse_raw_activity<R: Read>(
    reader: R,
    origin: &Path,
) -> Result<(Vec<ActivityRecord>, LoadReport), LoadError> {
    let mut csv = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let header = csv.headers().map_err(|source| LoadError::CsvHeader {
        path: origin.to_path_buf(),
        source,
    })?;
    let index = ColumnIndex::new(header);
    let timestamp = index.required("timestamp", origin)?;
    let chapter = index.required("chapter_id", origin)?;
    let all = index.required("all_feats", origin)?;
    let buildings = index.required("buildings", origin)?;
    let highways = index.required("highways", origin)?;
    let amenities = index.required("amenities", origin)?;
    let other = index.optional("other");

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for row in csv.records() {
        report.rows += 1;
        let Ok(row) = row else {
            report.skipped += 1;
            continue;
        };

        let parsed = (|| -> Result<ActivityRecord, RowError> {
            let raw_id = field(&row, Some(chapter));
            let chapter_id = ChapterId::parse(raw_id).map_err(|_| RowError {
                column: "chapter_id",
                value: raw_id.to_string(),
            })?;
            let all_feats = parse_count(field(&row, Some(all)), "all_feats")?;
            let b = parse_count(field(&row, Some(buildings)), "buildings")?;
            let h = parse_count(field(&row, Some(highways)), "highways")?;
            let a = parse_count(field(&row, Some(amenities)), "amenities")?;
            let other_raw = field(&row, other);
            let counts = if other_raw.is_empty() {
                FeatureCounts::derived(all_feats, b, h, a)
            } else {
                FeatureCounts {
                    all_feats,
                    buildings: b,
                    highways: h,
                    amenities: a,
                    other: parse_count(other_raw, "other")?,
                }
            };
            Ok(ActivityRecord {
                timestamp: parse_timestamp(field(&row, Some(timestamp)), "timestamp")?,
                chapter_id,
                counts,
            })
        })();

        match parsed {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(column = e.column, value = %e.value, "Skipping malformed event");
                report.skipped += 1;
            }
        }
    }

    report.loaded = records.len();
    Ok((records, report))
}

pub fn load_raw_activity(path: &Path) -> Result<(Vec<ActivityRecord>, LoadReport), LoadError> {
    let file = File::open(path).map_err(|source| LoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let (records, report) = parse_raw_activity(file, path)?;
    tracing::info!(path = %path.display(), loaded = report.loaded, skipped = report.skipped, "Loaded raw activity");
    Ok((records, report))
}

/// Load raw events and bucket them into per-chapter weeks.
pub fn load_weekly_from_raw(path: &Path) -> Result<WeeklyDataset, LoadError> {
    let (events, report) = load_raw_activity(path)?;
    let records = bucket_activity(&events);
    tracing::debug!(events = events.len(), weeks = records.len(), "Bucketed raw activity");
    Ok(WeeklyDataset {
        records,
        report,
        origin: DataOrigin::Loaded,
    })
}
