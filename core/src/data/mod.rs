//! Dataset loading: weekly activity CSV, raw events, the dataset manifest and
//! the synthetic fallback used when loading fails.

mod columns;
mod error;
mod fallback;
mod manifest;
mod raw;
mod weekly;

#[cfg(test)]
mod loader_tests;

pub use error::LoadError;
pub use fallback::{FALLBACK_CHAPTER, FALLBACK_WEEKS, fallback_weekly};
pub use manifest::{DatasetManifest, load_manifest, parse_manifest};
pub use raw::{load_raw_activity, load_weekly_from_raw, parse_raw_activity};
pub use weekly::{WeeklyDataset, load_weekly, parse_weekly};

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use ymdash_types::DataConfig;

/// Where a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Loaded,
    Fallback,
}

/// Row accounting for one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows: usize,
    pub loaded: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

/// Load the weekly dataset, substituting the synthetic series ending at
/// `today` when the file cannot be read.
pub fn weekly_or_fallback(path: &Path, today: NaiveDate) -> WeeklyDataset {
    or_fallback(load_weekly(path), today)
}

/// Load the activity dataset named by `config`: raw events bucketed into weeks
/// when a raw file is configured, the weekly CSV otherwise.
pub fn activity_or_fallback(config: &DataConfig, today: NaiveDate) -> WeeklyDataset {
    let loaded = match &config.raw_activity {
        Some(raw) => load_weekly_from_raw(Path::new(raw)),
        None => load_weekly(Path::new(&config.weekly_activity)),
    };
    or_fallback(loaded, today)
}

fn or_fallback(loaded: Result<WeeklyDataset, LoadError>, today: NaiveDate) -> WeeklyDataset {
    match loaded {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::warn!(error = %e, "Weekly activity unavailable, using synthetic series");
            let records = fallback_weekly(today);
            WeeklyDataset {
                report: LoadReport {
                    rows: records.len(),
                    loaded: records.len(),
                    ..LoadReport::default()
                },
                records,
                origin: DataOrigin::Fallback,
            }
        }
    }
}

/// Load the manifest, substituting an empty roster and `default_ds` on failure.
pub fn manifest_or_fallback(path: &Path, default_ds: &str) -> DatasetManifest {
    match load_manifest(path, default_ds) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::warn!(error = %e, ds = default_ds, "Dataset manifest unavailable, using defaults");
            DatasetManifest::fallback(default_ds)
        }
    }
}
