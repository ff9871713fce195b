//! Applies compiled filters to the activity layers.

use serde_json::Value;
use ymdash_types::TilesetConfig;

use super::error::RenderError;
use super::layers::{LayerSpec, layer_specs, tileset_sources};
use super::renderer::MapRenderer;
use crate::filter::CompiledFilter;

/// Owns the set of activity layers and keeps their filters in sync with the
/// selection.
#[derive(Debug, Clone)]
pub struct LayerController {
    tiles: TilesetConfig,
    dataset_date: String,
    specs: Vec<LayerSpec>,
}

impl LayerController {
    pub fn new(tiles: TilesetConfig) -> Self {
        let dataset_date = tiles.default_dataset_date.clone();
        let specs = layer_specs(&tiles);
        Self {
            tiles,
            dataset_date,
            specs,
        }
    }

    pub fn dataset_date(&self) -> &str {
        &self.dataset_date
    }

    /// Point tileset sources at another published dataset. Takes effect on the
    /// next [`install_layers`](Self::install_layers).
    pub fn set_dataset_date(&mut self, date: impl Into<String>) {
        self.dataset_date = date.into();
    }

    pub fn specs(&self) -> &[LayerSpec] {
        &self.specs
    }

    pub fn layer_ids(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|spec| spec.id.as_str())
    }

    /// Layers drawn at `zoom`.
    pub fn visible_layers(&self, zoom: f64) -> Vec<&str> {
        self.specs
            .iter()
            .filter(|spec| spec.visible_at(zoom))
            .map(|spec| spec.id.as_str())
            .collect()
    }

    /// Register tileset sources and add every activity layer below `before`.
    /// Sources and layers already present are left untouched. Returns the
    /// number of layers added.
    pub fn install_layers<M: MapRenderer + ?Sized>(
        &self,
        map: &mut M,
        before: Option<&str>,
    ) -> Result<usize, RenderError> {
        for source in tileset_sources(&self.tiles, &self.dataset_date) {
            if !map.has_source(&source.id) {
                map.add_source(source)?;
            }
        }

        let mut added = 0;
        for spec in &self.specs {
            if map.has_layer(&spec.id) {
                continue;
            }
            map.add_layer(spec.clone(), before)?;
            added += 1;
        }
        tracing::info!(
            added,
            dataset = %self.dataset_date,
            before = before.unwrap_or("<top>"),
            "Installed activity layers"
        );
        Ok(added)
    }

    /// Apply `filter` to every managed layer present on the map; `None` clears
    /// all filters. Absent layers are skipped. Returns the number of layers
    /// written.
    pub fn apply_filter<M: MapRenderer + ?Sized>(
        &self,
        map: &mut M,
        filter: Option<&CompiledFilter>,
    ) -> Result<usize, RenderError> {
        let expression = filter.map(CompiledFilter::to_expression);
        match &expression {
            Some(expr) => self.write_all(map, Some(expr)),
            None => self.clear_filters(map),
        }
    }

    /// Remove the filter from every managed layer.
    pub fn clear_filters<M: MapRenderer + ?Sized>(&self, map: &mut M) -> Result<usize, RenderError> {
        self.write_all(map, None)
    }

    fn write_all<M: MapRenderer + ?Sized>(
        &self,
        map: &mut M,
        expression: Option<&Value>,
    ) -> Result<usize, RenderError> {
        let mut written = 0;
        for id in self.layer_ids() {
            if !map.has_layer(id) {
                tracing::debug!(layer = id, "Layer not on map, skipping filter");
                continue;
            }
            map.set_filter(id, expression.cloned())?;
            written += 1;
        }
        tracing::debug!(
            layers = written,
            cleared = expression.is_none(),
            "Applied layer filters"
        );
        Ok(written)
    }
}
