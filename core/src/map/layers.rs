//! Activity layer and tileset definitions.
//!
//! Every layer is derived from [`TilesetConfig`]: heatmap tiers, the bounding
//! box outline and the centroid labels. Paint stops for the known tiers live in
//! a static table; tiers without an entry get a generic ramp.

use phf::phf_map;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ymdash_types::{LabelTier, MapConfig, OutlineTier, ResolutionTier, TilesetConfig};

use super::renderer::SourceSpec;

pub const VISIBILITY: &str = "visibility";
const OUTLINE_COLOR: &str = "#ff6b35";
const LABEL_COLOR: &str = "black";
const LABEL_SIZE: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Heatmap,
    Line,
    Symbol,
}

/// A style layer, serialized in the map style JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub source: String,
    #[serde(rename = "source-layer")]
    pub source_layer: String,
    #[serde(rename = "minzoom")]
    pub min_zoom: f64,
    #[serde(rename = "maxzoom", skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
    pub paint: Value,
    pub layout: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
}

impl LayerSpec {
    /// Whether the layer draws at `zoom`. `maxzoom` is exclusive.
    pub fn visible_at(&self, zoom: f64) -> bool {
        zoom >= self.min_zoom && self.max_zoom.is_none_or(|max| zoom < max)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Paint presets
// ─────────────────────────────────────────────────────────────────────────────

struct HeatmapPreset {
    intensity: &'static [(f64, f64)],
    radius: &'static [(f64, f64)],
    opacity: Option<&'static [(f64, f64)]>,
}

static HEATMAP_PRESETS: phf::Map<&'static str, HeatmapPreset> = phf_map! {
    "r4agg" => HeatmapPreset {
        intensity: &[(2.0, 1.0), (3.0, 1.5)],
        radius: &[(2.0, 2.0), (3.0, 4.0)],
        opacity: None,
    },
    "r6agg" => HeatmapPreset {
        intensity: &[(3.0, 1.0), (5.0, 1.5)],
        radius: &[(3.0, 4.0), (5.0, 6.0)],
        opacity: None,
    },
    "r8agg" => HeatmapPreset {
        intensity: &[(5.0, 1.0), (15.0, 1.0)],
        radius: &[(5.0, 2.0), (10.0, 5.0), (11.0, 8.0), (12.0, 50.0), (15.0, 200.0)],
        opacity: Some(&[(12.0, 1.0), (13.0, 0.5), (14.0, 0.1), (15.0, 0.01)]),
    },
};

const OUTLINE_WIDTH: &[(f64, f64)] = &[(6.0, 0.5), (10.0, 1.0), (15.0, 2.0)];
const OUTLINE_OPACITY: &[(f64, f64)] = &[(6.0, 0.3), (10.0, 0.6), (15.0, 0.8)];

fn interpolate(input: Value, stops: &[(f64, f64)]) -> Value {
    let mut expr = vec![json!("interpolate"), json!(["linear"]), input];
    for (stop, value) in stops {
        expr.push(json!(stop));
        expr.push(json!(value));
    }
    Value::Array(expr)
}

fn zoom_ramp(stops: &[(f64, f64)]) -> Value {
    interpolate(json!(["zoom"]), stops)
}

// ─────────────────────────────────────────────────────────────────────────────
// Layer builders
// ─────────────────────────────────────────────────────────────────────────────

pub fn heatmap_layer(tier: &ResolutionTier) -> LayerSpec {
    let weight = interpolate(
        json!(["get", "all_feats"]),
        &[(0.0, 0.0), (tier.weight_saturation, 1.0)],
    );

    let mut paint = serde_json::Map::new();
    paint.insert("heatmap-weight".into(), weight);
    match HEATMAP_PRESETS.get(tier.id.as_str()) {
        Some(preset) => {
            paint.insert("heatmap-intensity".into(), zoom_ramp(preset.intensity));
            paint.insert("heatmap-radius".into(), zoom_ramp(preset.radius));
            if let Some(opacity) = preset.opacity {
                paint.insert("heatmap-opacity".into(), zoom_ramp(opacity));
            }
        }
        None => {
            let (lo, hi) = (tier.min_zoom, tier.max_zoom);
            paint.insert("heatmap-intensity".into(), zoom_ramp(&[(lo, 1.0), (hi, 1.5)]));
            paint.insert("heatmap-radius".into(), zoom_ramp(&[(lo, 2.0), (hi, 6.0)]));
        }
    }

    LayerSpec {
        id: tier.id.clone(),
        kind: LayerKind::Heatmap,
        source: tier.id.clone(),
        source_layer: tier.source_layer.clone(),
        min_zoom: tier.min_zoom,
        max_zoom: Some(tier.max_zoom),
        paint: Value::Object(paint),
        layout: json!({}),
        filter: None,
    }
}

pub fn outline_layer(outline: &OutlineTier) -> LayerSpec {
    LayerSpec {
        id: outline.id.clone(),
        kind: LayerKind::Line,
        source: outline.id.clone(),
        source_layer: outline.source_layer.clone(),
        min_zoom: outline.min_zoom,
        max_zoom: None,
        paint: json!({
            "line-color": OUTLINE_COLOR,
            "line-width": zoom_ramp(OUTLINE_WIDTH),
            "line-opacity": zoom_ramp(OUTLINE_OPACITY),
        }),
        layout: json!({ VISIBILITY: "visible" }),
        filter: None,
    }
}

pub fn label_layer(labels: &LabelTier) -> LayerSpec {
    LayerSpec {
        id: labels.id.clone(),
        kind: LayerKind::Symbol,
        source: labels.source.clone(),
        source_layer: labels.source_layer.clone(),
        min_zoom: labels.min_zoom,
        max_zoom: None,
        paint: json!({
            "text-opacity": 1,
            "text-color": LABEL_COLOR,
        }),
        layout: json!({
            "text-field": ["get", "all_feats"],
            "text-size": LABEL_SIZE,
        }),
        filter: None,
    }
}

/// All activity layers, bottom first.
pub fn layer_specs(config: &TilesetConfig) -> Vec<LayerSpec> {
    config
        .tiers
        .iter()
        .map(heatmap_layer)
        .chain([outline_layer(&config.outline), label_layer(&config.labels)])
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tilesets
// ─────────────────────────────────────────────────────────────────────────────

/// `pmtiles://{cdn}/ds={date}/{file}`
pub fn tileset_url(cdn_base: &str, dataset_date: &str, file: &str) -> String {
    format!(
        "pmtiles://{}/ds={}/{}",
        cdn_base.trim_end_matches('/'),
        dataset_date,
        file
    )
}

/// Vector sources for every tier plus the outline tileset.
pub fn tileset_sources(config: &TilesetConfig, dataset_date: &str) -> Vec<SourceSpec> {
    config
        .tiers
        .iter()
        .map(|tier| (tier.id.as_str(), tier.file.as_str()))
        .chain(std::iter::once((
            config.outline.id.as_str(),
            config.outline.file.as_str(),
        )))
        .map(|(id, file)| SourceSpec {
            id: id.to_string(),
            url: tileset_url(&config.cdn_base, dataset_date, file),
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Base style
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleVariant {
    #[default]
    Light,
    Dark,
}

impl StyleVariant {
    pub fn from_config(config: &MapConfig) -> Self {
        if config.dark { Self::Dark } else { Self::Light }
    }

    pub fn url(self, config: &MapConfig) -> &str {
        match self {
            Self::Light => &config.light_style_url,
            Self::Dark => &config.dark_style_url,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}
