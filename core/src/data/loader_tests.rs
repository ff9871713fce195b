//! Tests for dataset loaders

use std::io::Write;
use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};
use tempfile::NamedTempFile;
use ymdash_types::ChapterId;

use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

const WEEKLY: &str = "\
week,chapter_id,all_feats,buildings,highways,amenities,other,mappers
2024-01-08,2,20,10,5,1,4,3
2024-01-01,1,10,5,2,1,2,2
2024-01-01,2,5,5,0,0,0,1
";

// ─────────────────────────────────────────────────────────────────────────────
// Weekly CSV
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_parse_weekly_sorted() {
    let dataset = parse_weekly(WEEKLY.as_bytes(), Path::new("weekly.csv")).expect("parse");
    assert_eq!(dataset.report.loaded, 3);
    assert_eq!(dataset.report.skipped, 0);
    assert_eq!(dataset.origin, DataOrigin::Loaded);

    let keys: Vec<_> = dataset.records.iter().map(|r| (r.week, r.chapter_id.value())).collect();
    assert_eq!(
        keys,
        [(date(2024, 1, 1), 1), (date(2024, 1, 1), 2), (date(2024, 1, 8), 2)]
    );
    assert_eq!(dataset.records[2].mappers, 3);
    assert_eq!(dataset.records[2].counts.other, 4);
}

#[test]
fn test_column_order_and_missing_other() {
    let csv = "\
chapter_id,mappers,week,amenities,highways,buildings,all_feats
7,4,2024-02-05,1,2,3,10
";
    let dataset = parse_weekly(csv.as_bytes(), Path::new("weekly.csv")).expect("parse");
    let record = &dataset.records[0];
    assert_eq!(record.chapter_id, ChapterId(7));
    assert_eq!(record.counts.other, 4, "derived as all - b - h - a");
    assert_eq!(record.mappers, 4);
}

#[test]
fn test_malformed_rows_skipped() {
    let csv = "\
week,chapter_id,all_feats,buildings,highways,amenities,mappers
2024-01-01,1,10,5,2,1,1
not-a-date,1,10,5,2,1,1
2024-01-08,abc,10,5,2,1,1
2024-01-15,1,lots,5,2,1,1
2024-01-22,1.0,12.0,,,,
";
    let dataset = parse_weekly(csv.as_bytes(), Path::new("weekly.csv")).expect("parse");
    assert_eq!(dataset.report.rows, 5);
    assert_eq!(dataset.report.skipped, 3);
    assert_eq!(dataset.report.loaded, 2);

    let last = &dataset.records[1];
    assert_eq!(last.chapter_id, ChapterId(1), "integral float id accepted");
    assert_eq!(last.counts.all_feats, 12);
    assert_eq!(last.counts.buildings, 0, "blank counts are zero");
}

#[test]
fn test_duplicate_week_chapter_keeps_first() {
    let csv = "\
week,chapter_id,all_feats,buildings,highways,amenities
2024-01-01,1,10,0,0,0
2024-01-01,1,99,0,0,0
";
    let dataset = parse_weekly(csv.as_bytes(), Path::new("weekly.csv")).expect("parse");
    assert_eq!(dataset.records.len(), 1);
    assert_eq!(dataset.records[0].counts.all_feats, 10);
    assert_eq!(dataset.report.duplicates, 1);
}

#[test]
fn test_missing_required_column() {
    let csv = "week,chapter_id,all_feats\n2024-01-01,1,10\n";
    let err = parse_weekly(csv.as_bytes(), Path::new("weekly.csv")).unwrap_err();
    assert!(matches!(err, LoadError::MissingColumn { column: "buildings", .. }));
}

#[test]
fn test_load_weekly_from_file() {
    let file = write_temp(WEEKLY);
    let dataset = load_weekly(file.path()).expect("load");
    assert_eq!(dataset.records.len(), 3);
}

#[test]
fn test_missing_file_falls_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let today = date(2024, 6, 12);
    let dataset = weekly_or_fallback(&dir.path().join("missing.csv"), today);

    assert_eq!(dataset.origin, DataOrigin::Fallback);
    assert_eq!(dataset.records.len(), FALLBACK_WEEKS);
    assert_eq!(dataset.records.last().map(|r| r.week), Some(date(2024, 6, 10)));
    assert!(dataset.records.iter().all(|r| r.week.weekday() == Weekday::Mon));
}

#[test]
fn test_fallback_is_deterministic() {
    let today = date(2025, 3, 1);
    assert_eq!(fallback_weekly(today), fallback_weekly(today));
    assert!(fallback_weekly(today).iter().all(|r| r.counts.all_feats >= 0));
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw events
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_parse_raw_activity() {
    let csv = "\
timestamp,chapter_id,all_feats,buildings,highways,amenities
1704067200,1,10,5,2,1
2024-01-02T12:00:00Z,2,4,4,0,0
2024-01-03,3,1,0,0,0
yesterday,4,1,0,0,0
";
    let (records, report) = parse_raw_activity(csv.as_bytes(), Path::new("raw.csv")).expect("parse");
    assert_eq!(report.loaded, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(records[0].timestamp, 1_704_067_200);
    assert_eq!(records[0].counts.other, 2);
    assert_eq!(records[1].timestamp, 1_704_196_800);
    assert_eq!(records[2].timestamp, 1_704_240_000);
}

#[test]
fn test_configured_raw_file_is_bucketed_weekly() {
    let file = write_temp(
        "timestamp,chapter_id,all_feats,buildings,highways,amenities\n\
         2024-01-02,1,3,1,1,1\n\
         2024-01-04,1,2,2,0,0\n\
         2024-01-09,1,5,0,5,0\n",
    );
    let config = ymdash_types::DataConfig {
        raw_activity: Some(file.path().display().to_string()),
        ..Default::default()
    };
    let dataset = activity_or_fallback(&config, date(2024, 6, 1));

    assert_eq!(dataset.origin, DataOrigin::Loaded);
    let weeks: Vec<_> = dataset.records.iter().map(|r| (r.week, r.counts.all_feats)).collect();
    assert_eq!(weeks, [(date(2024, 1, 1), 5), (date(2024, 1, 8), 5)]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Manifest
// ─────────────────────────────────────────────────────────────────────────────

const MANIFEST: &str = r#"{
  "ds": "2025-09-01",
  "chapters": [
    {"chapter_id": 12, "chapter": "GMU Mappers", "country": "United States", "university": "George Mason University"},
    {"chapter_id": "7", "chapter": "KNUST YouthMappers", "country": "Ghana"},
    {"chapter_id": 3, "chapter": "No Country"},
    {"chapter": "No Id", "country": "Peru"},
    {"chapter_id": 4, "chapter": "  ", "country": "Peru"}
  ]
}"#;

#[test]
fn test_parse_manifest_filters_incomplete_chapters() {
    let manifest = parse_manifest(MANIFEST, "2025-08-04").expect("parse");
    assert_eq!(manifest.ds, "2025-09-01");
    assert_eq!(manifest.chapters.len(), 2);
    assert_eq!(manifest.excluded, 3);
    assert_eq!(manifest.chapters[1].chapter_id, ChapterId(7), "string id canonicalized");
}

#[test]
fn test_manifest_without_ds_uses_default() {
    let manifest = parse_manifest(r#"{"chapters": []}"#, "2025-08-04").expect("parse");
    assert_eq!(manifest.ds, "2025-08-04");
}

#[test]
fn test_bad_manifest_falls_back() {
    let file = write_temp("{ not json");
    assert!(matches!(
        load_manifest(file.path(), "2025-08-04"),
        Err(LoadError::ParseManifest { .. })
    ));

    let manifest = manifest_or_fallback(file.path(), "2025-08-04");
    assert_eq!(manifest.origin, DataOrigin::Fallback);
    assert_eq!(manifest.ds, "2025-08-04");
    assert!(manifest.chapters.is_empty());
}
