//! Published dataset manifest (`activity.json`).

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use ymdash_types::{Chapter, ChapterId};

use super::DataOrigin;
use super::error::LoadError;

#[derive(Debug, Clone)]
pub struct DatasetManifest {
    /// Dataset date (`ds`) naming the tileset directory
    pub ds: String,
    /// Chapters with a name, ID and country
    pub chapters: Vec<Chapter>,
    /// Entries dropped for missing fields
    pub excluded: usize,
    pub origin: DataOrigin,
}

impl DatasetManifest {
    pub fn fallback(default_ds: &str) -> Self {
        Self {
            ds: default_ds.to_string(),
            chapters: Vec::new(),
            excluded: 0,
            origin: DataOrigin::Fallback,
        }
    }
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    ds: Option<String>,
    #[serde(default)]
    chapters: Vec<RawChapter>,
}

#[derive(Deserialize)]
struct RawChapter {
    #[serde(default)]
    chapter_id: Option<Value>,
    #[serde(default)]
    chapter: Option<String>,
    #[serde(default)]
    university: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl RawChapter {
    fn id(&self) -> Option<ChapterId> {
        match self.chapter_id.as_ref()? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(ChapterId),
            Value::String(s) => ChapterId::parse(s).ok(),
            _ => None,
        }
    }

    fn into_chapter(self) -> Option<Chapter> {
        let chapter_id = self.id()?;
        Some(Chapter {
            chapter_id,
            chapter: non_empty(self.chapter)?,
            country: Some(non_empty(self.country)?),
            university: non_empty(self.university),
            city: non_empty(self.city),
        })
    }
}

/// Parse manifest JSON. A missing `ds` falls back to `default_ds`.
pub fn parse_manifest(text: &str, default_ds: &str) -> Result<DatasetManifest, serde_json::Error> {
    let raw: RawManifest = serde_json::from_str(text)?;
    let total = raw.chapters.len();
    let chapters: Vec<Chapter> = raw
        .chapters
        .into_iter()
        .filter_map(RawChapter::into_chapter)
        .collect();
    let excluded = total - chapters.len();
    if excluded > 0 {
        tracing::debug!(excluded, "Excluded chapters missing name, id or country");
    }

    Ok(DatasetManifest {
        ds: non_empty(raw.ds).unwrap_or_else(|| default_ds.to_string()),
        chapters,
        excluded,
        origin: DataOrigin::Loaded,
    })
}

pub fn load_manifest(path: &Path, default_ds: &str) -> Result<DatasetManifest, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest = parse_manifest(&text, default_ds).map_err(|source| LoadError::ParseManifest {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        ds = %manifest.ds,
        chapters = manifest.chapters.len(),
        "Loaded dataset manifest"
    );
    Ok(manifest)
}
