//! Weekly per-chapter activity CSV.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use hashbrown::HashSet;
use ymdash_types::{ChapterId, FeatureCounts, WeeklyChapterRecord};

use super::columns::{ColumnIndex, RowError, field, parse_count, parse_date};
use super::error::LoadError;
use super::{DataOrigin, LoadReport};

#[derive(Debug, Clone)]
pub struct WeeklyDataset {
    /// Sorted by week, then chapter
    pub records: Vec<WeeklyChapterRecord>,
    pub report: LoadReport,
    pub origin: DataOrigin,
}

struct WeeklyColumns {
    week: usize,
    chapter_id: usize,
    all_feats: usize,
    buildings: usize,
    highways: usize,
    amenities: usize,
    other: Option<usize>,
    mappers: Option<usize>,
}

impl WeeklyColumns {
    fn locate(index: &ColumnIndex, path: &Path) -> Result<Self, LoadError> {
        Ok(Self {
            week: index.required("week", path)?,
            chapter_id: index.required("chapter_id", path)?,
            all_feats: index.required("all_feats", path)?,
            buildings: index.required("buildings", path)?,
            highways: index.required("highways", path)?,
            amenities: index.required("amenities", path)?,
            other: index.optional("other"),
            mappers: index.optional("mappers"),
        })
    }

    fn parse(&self, row: &StringRecord) -> Result<WeeklyChapterRecord, RowError> {
        let week = parse_date(field(row, Some(self.week)), "week")?;
        let raw_id = field(row, Some(self.chapter_id));
        let chapter_id = ChapterId::parse(raw_id).map_err(|_| RowError {
            column: "chapter_id",
            value: raw_id.to_string(),
        })?;

        let all_feats = parse_count(field(row, Some(self.all_feats)), "all_feats")?;
        let buildings = parse_count(field(row, Some(self.buildings)), "buildings")?;
        let highways = parse_count(field(row, Some(self.highways)), "highways")?;
        let amenities = parse_count(field(row, Some(self.amenities)), "amenities")?;

        let other_raw = field(row, self.other);
        let counts = if other_raw.is_empty() {
            FeatureCounts::derived(all_feats, buildings, highways, amenities)
        } else {
            FeatureCounts {
                all_feats,
                buildings,
                highways,
                amenities,
                other: parse_count(other_raw, "other")?,
            }
        };

        Ok(WeeklyChapterRecord {
            week,
            chapter_id,
            counts,
            mappers: parse_count(field(row, self.mappers), "mappers")?,
        })
    }
}

/// Parse weekly rows from `reader`. `origin` names the source in errors and
/// logs.
///
/// Rows with unparseable fields are skipped individually. A second row for the
/// same (week, chapter) pair is dropped; the first one wins.
pub fn parse_weekly<R: Read>(reader: R, origin: &Path) -> Result<WeeklyDataset, LoadError> {
    let mut csv = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let header = csv.headers().map_err(|source| LoadError::CsvHeader {
        path: origin.to_path_buf(),
        source,
    })?;
    let columns = WeeklyColumns::locate(&ColumnIndex::new(header), origin)?;

    let mut report = LoadReport::default();
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for (line, row) in csv.records().enumerate() {
        report.rows += 1;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(path = %origin.display(), line = line + 2, error = %e, "Unreadable CSV row");
                report.skipped += 1;
                continue;
            }
        };
        match columns.parse(&row) {
            Ok(record) => {
                if !seen.insert((record.week, record.chapter_id)) {
                    tracing::warn!(
                        week = %record.week,
                        chapter_id = %record.chapter_id,
                        "Duplicate weekly row, keeping the first"
                    );
                    report.duplicates += 1;
                    continue;
                }
                records.push(record);
            }
            Err(e) => {
                tracing::warn!(
                    path = %origin.display(),
                    line = line + 2,
                    column = e.column,
                    value = %e.value,
                    "Skipping malformed row"
                );
                report.skipped += 1;
            }
        }
    }

    records.sort_by_key(|r| (r.week, r.chapter_id));
    report.loaded = records.len();
    Ok(WeeklyDataset {
        records,
        report,
        origin: DataOrigin::Loaded,
    })
}

pub fn load_weekly(path: &Path) -> Result<WeeklyDataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = parse_weekly(file, path)?;
    tracing::info!(
        path = %path.display(),
        loaded = dataset.report.loaded,
        skipped = dataset.report.skipped,
        duplicates = dataset.report.duplicates,
        "Loaded weekly activity"
    );
    Ok(dataset)
}
