//! Shared data and configuration types for ymdash
//!
//! This crate contains serializable types that are shared between the
//! dashboard core (ymdash-core) and the driver shell (ymdash).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Chapter Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Rejected chapter ID input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChapterIdError {
    #[error("empty chapter id")]
    Empty,

    #[error("chapter id '{input}' is not a number")]
    NotNumeric { input: String },

    #[error("chapter id '{input}' is not an integer")]
    NotIntegral { input: String },
}

/// Canonical chapter identifier.
///
/// Chapter IDs arrive both as numbers (feature properties, dataset rows) and as
/// strings (form inputs). Every string crosses into the core through
/// [`ChapterId::parse`] so the two forms always compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(pub i64);

impl ChapterId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    /// Canonicalize a textual chapter ID (`"7"`, `" 7 "` and `"7.0"` are all 7).
    pub fn parse(input: &str) -> Result<Self, ChapterIdError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ChapterIdError::Empty);
        }
        if let Ok(id) = trimmed.parse::<i64>() {
            return Ok(Self(id));
        }
        let float = trimmed
            .parse::<f64>()
            .map_err(|_| ChapterIdError::NotNumeric {
                input: trimmed.to_string(),
            })?;
        if float.is_finite() && float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
            Ok(Self(float as i64))
        } else {
            Err(ChapterIdError::NotIntegral {
                input: trimmed.to_string(),
            })
        }
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChapterId {
    type Err = ChapterIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for ChapterId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Ordered set of selected chapters. Empty means "no chapter restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterSet(BTreeSet<ChapterId>);

impl ChapterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: ChapterId) -> bool {
        self.0.contains(&id)
    }

    /// True when `id` passes this selection (an empty selection admits everything).
    pub fn admits(&self, id: ChapterId) -> bool {
        self.0.is_empty() || self.0.contains(&id)
    }

    pub fn insert(&mut self, id: ChapterId) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: ChapterId) -> bool {
        self.0.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = ChapterId> + '_ {
        self.0.iter().copied()
    }

    /// Raw integer IDs in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        self.0.iter().map(|id| id.0).collect()
    }

    /// Returns a copy with `id` added if absent, removed if present.
    pub fn toggled(&self, id: ChapterId) -> Self {
        let mut next = self.clone();
        if !next.remove(id) {
            next.insert(id);
        }
        next
    }
}

impl FromIterator<ChapterId> for ChapterSet {
    fn from_iter<T: IntoIterator<Item = ChapterId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromIterator<i64> for ChapterSet {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self(iter.into_iter().map(ChapterId).collect())
    }
}

/// A chapter from the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter_id: ChapterId,
    /// Display name
    pub chapter: String,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Time Range
// ─────────────────────────────────────────────────────────────────────────────

/// Closed time interval in epoch seconds. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    /// Build a range, swapping the bounds if given in reverse.
    pub fn new(start: i64, end: i64) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Range covering whole days from the start of `first` to the start of `last`.
    pub fn from_dates(first: NaiveDate, last: NaiveDate) -> Self {
        Self::new(date_to_epoch(first), date_to_epoch(last))
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    pub fn span_secs(&self) -> i64 {
        self.end - self.start
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (
            DateTime::from_timestamp(self.start, 0),
            DateTime::from_timestamp(self.end, 0),
        ) {
            (Some(start), Some(end)) => write!(
                f,
                "{} - {}",
                start.format("%b %-d, %Y"),
                end.format("%b %-d, %Y")
            ),
            _ => write!(f, "{} - {}", self.start, self.end),
        }
    }
}

/// Midnight UTC of `date` as epoch seconds.
pub fn date_to_epoch(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Activity Records
// ─────────────────────────────────────────────────────────────────────────────

/// Per-category feature edit counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCounts {
    pub all_feats: i64,
    pub buildings: i64,
    pub highways: i64,
    pub amenities: i64,
    pub other: i64,
}

impl FeatureCounts {
    /// Counts with `other` derived from the remaining categories.
    /// The result may be negative when upstream totals are inconsistent.
    pub fn derived(all_feats: i64, buildings: i64, highways: i64, amenities: i64) -> Self {
        Self {
            all_feats,
            buildings,
            highways,
            amenities,
            other: all_feats
                .saturating_sub(buildings)
                .saturating_sub(highways)
                .saturating_sub(amenities),
        }
    }

    /// Field-wise sum, saturating at the `i64` bounds.
    pub fn add(&mut self, other: &FeatureCounts) {
        self.all_feats = self.all_feats.saturating_add(other.all_feats);
        self.buildings = self.buildings.saturating_add(other.buildings);
        self.highways = self.highways.saturating_add(other.highways);
        self.amenities = self.amenities.saturating_add(other.amenities);
        self.other = self.other.saturating_add(other.other);
    }
}

/// A raw editing event attributed to a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Epoch seconds
    pub timestamp: i64,
    pub chapter_id: ChapterId,
    #[serde(flatten)]
    pub counts: FeatureCounts,
}

/// One row per (week, chapter) of pre-aggregated activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyChapterRecord {
    /// Bucket start
    pub week: NaiveDate,
    pub chapter_id: ChapterId,
    #[serde(flatten)]
    pub counts: FeatureCounts,
    pub mappers: i64,
}

/// Totals for one time bucket across the selected chapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBucket {
    pub bucket_start: NaiveDate,
    pub all_feats: i64,
    pub buildings: i64,
    pub highways: i64,
    pub amenities: i64,
    pub other: i64,
    pub mappers: i64,
    pub chapter_count: usize,
    /// Trailing-window mean of `all_feats`
    pub rolling_value: f64,
}

impl AggregatedBucket {
    pub fn counts(&self) -> FeatureCounts {
        FeatureCounts {
            all_feats: self.all_feats,
            buildings: self.buildings,
            highways: self.highways,
            amenities: self.amenities,
            other: self.other,
        }
    }

    pub fn bucket_epoch(&self) -> i64 {
        date_to_epoch(self.bucket_start)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Selection State
// ─────────────────────────────────────────────────────────────────────────────

/// The active dashboard selection.
///
/// `time_range == None` means no temporal restriction has been applied yet,
/// which differs from an explicit full-extent range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub time_range: Option<TimeRange>,
    pub chapter_ids: ChapterSet,
}

impl SelectionState {
    pub fn is_unrestricted(&self) -> bool {
        self.time_range.is_none() && self.chapter_ids.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serde Default Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn default_weekly_path() -> String {
    "public/weekly_chapter_activity.csv".to_string()
}
fn default_manifest_path() -> String {
    "public/activity.json".to_string()
}
fn default_cdn_base() -> String {
    "https://d1tgv18374hiy.cloudfront.net/activity-dashboard".to_string()
}
fn default_dataset_date() -> String {
    "2025-08-04".to_string()
}
fn default_light_style() -> String {
    "https://api.maptiler.com/maps/dataviz/style.json".to_string()
}
fn default_dark_style() -> String {
    "https://api.maptiler.com/maps/dataviz-dark/style.json".to_string()
}
fn default_label_layer() -> String {
    "Village labels".to_string()
}
fn default_center() -> [f64; 2] {
    [0.0, 15.0]
}
fn default_zoom() -> f64 {
    2.1
}
fn default_min_zoom() -> f64 {
    2.01
}
fn default_max_zoom() -> f64 {
    14.99
}
fn default_rolling_window() -> usize {
    4
}
fn default_brush_fraction() -> f64 {
    0.05
}
fn default_brush_cap_px() -> f64 {
    100.0
}
fn default_min_brush_px() -> f64 {
    10.0
}
fn default_drag_threshold_px() -> f64 {
    5.0
}
fn default_edge_handle_px() -> f64 {
    6.0
}
fn default_key_step_fraction() -> f64 {
    0.01
}
fn default_key_resize_fraction() -> f64 {
    0.1
}
fn default_resize_debounce_ms() -> u64 {
    200
}
fn default_redraw_tolerance_px() -> f64 {
    5.0
}
fn default_heatmap_tiers() -> Vec<ResolutionTier> {
    vec![
        ResolutionTier {
            id: "r4agg".to_string(),
            file: "res4.pmtiles".to_string(),
            source_layer: "r4agg".to_string(),
            min_zoom: 2.0,
            max_zoom: 4.01,
            weight_saturation: 100.0,
        },
        ResolutionTier {
            id: "r6agg".to_string(),
            file: "res6.pmtiles".to_string(),
            source_layer: "r6agg".to_string(),
            min_zoom: 4.0,
            max_zoom: 6.01,
            weight_saturation: 100.0,
        },
        ResolutionTier {
            id: "r8agg".to_string(),
            file: "res8.pmtiles".to_string(),
            source_layer: "daily".to_string(),
            min_zoom: 6.0,
            max_zoom: 15.0,
            weight_saturation: 10.0,
        },
    ]
}
fn default_outline_tier() -> OutlineTier {
    OutlineTier {
        id: "r8agg_bboxes".to_string(),
        file: "res8_bboxes.pmtiles".to_string(),
        source_layer: "daily".to_string(),
        min_zoom: 6.0,
    }
}
fn default_label_tier() -> LabelTier {
    LabelTier {
        id: "centroids".to_string(),
        source: "r8agg".to_string(),
        source_layer: "daily".to_string(),
        min_zoom: 13.0,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dashboard Config
// ─────────────────────────────────────────────────────────────────────────────

/// Dataset file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_weekly_path")]
    pub weekly_activity: String,
    #[serde(default = "default_manifest_path")]
    pub manifest: String,
    /// Optional raw event CSV, bucketed into weeks when present
    #[serde(default)]
    pub raw_activity: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            weekly_activity: default_weekly_path(),
            manifest: default_manifest_path(),
            raw_activity: None,
        }
    }
}

/// A heatmap aggregation tier (one tileset per spatial resolution).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionTier {
    /// Layer and source ID
    pub id: String,
    /// Tileset file name under the dataset directory
    pub file: String,
    pub source_layer: String,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// `all_feats` value at which heatmap weight saturates
    pub weight_saturation: f64,
}

/// Bounding-box outline companion of the finest tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineTier {
    pub id: String,
    pub file: String,
    pub source_layer: String,
    pub min_zoom: f64,
}

/// Label / centroid layer drawn from an existing tier source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTier {
    pub id: String,
    pub source: String,
    pub source_layer: String,
    pub min_zoom: f64,
}

/// Tileset hosting and resolution tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetConfig {
    #[serde(default = "default_cdn_base")]
    pub cdn_base: String,
    /// Dataset date used when the manifest cannot be loaded
    #[serde(default = "default_dataset_date")]
    pub default_dataset_date: String,
    #[serde(default = "default_heatmap_tiers")]
    pub tiers: Vec<ResolutionTier>,
    #[serde(default = "default_outline_tier")]
    pub outline: OutlineTier,
    #[serde(default = "default_label_tier")]
    pub labels: LabelTier,
}

impl Default for TilesetConfig {
    fn default() -> Self {
        Self {
            cdn_base: default_cdn_base(),
            default_dataset_date: default_dataset_date(),
            tiers: default_heatmap_tiers(),
            outline: default_outline_tier(),
            labels: default_label_tier(),
        }
    }
}

/// Base map style and camera bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_light_style")]
    pub light_style_url: String,
    #[serde(default = "default_dark_style")]
    pub dark_style_url: String,
    #[serde(default)]
    pub dark: bool,
    /// Basemap layer the activity layers are inserted below
    #[serde(default = "default_label_layer")]
    pub insert_below: String,
    #[serde(default = "default_center")]
    pub center: [f64; 2],
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            light_style_url: default_light_style(),
            dark_style_url: default_dark_style(),
            dark: false,
            insert_below: default_label_layer(),
            center: default_center(),
            zoom: default_zoom(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}

/// Timeline and brush tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Trailing window (in buckets) of the rolling average
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,
    /// Width of a click-created brush as a fraction of the chart width
    #[serde(default = "default_brush_fraction")]
    pub default_brush_fraction: f64,
    #[serde(default = "default_brush_cap_px")]
    pub default_brush_cap_px: f64,
    #[serde(default = "default_min_brush_px")]
    pub min_brush_px: f64,
    #[serde(default = "default_drag_threshold_px")]
    pub drag_threshold_px: f64,
    #[serde(default = "default_edge_handle_px")]
    pub edge_handle_px: f64,
    #[serde(default = "default_key_step_fraction")]
    pub key_step_fraction: f64,
    #[serde(default = "default_key_resize_fraction")]
    pub key_resize_fraction: f64,
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
    #[serde(default = "default_redraw_tolerance_px")]
    pub redraw_tolerance_px: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            rolling_window: default_rolling_window(),
            default_brush_fraction: default_brush_fraction(),
            default_brush_cap_px: default_brush_cap_px(),
            min_brush_px: default_min_brush_px(),
            drag_threshold_px: default_drag_threshold_px(),
            edge_handle_px: default_edge_handle_px(),
            key_step_fraction: default_key_step_fraction(),
            key_resize_fraction: default_key_resize_fraction(),
            resize_debounce_ms: default_resize_debounce_ms(),
            redraw_tolerance_px: default_redraw_tolerance_px(),
        }
    }
}

/// Top-level dashboard configuration.
///
/// Note: Persistence methods (load/save) are provided by ymdash-core via the
/// `DashboardConfigExt` trait.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub tiles: TilesetConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
}
