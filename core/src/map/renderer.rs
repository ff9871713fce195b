//! Map renderer seam.
//!
//! The dashboard never talks to a concrete map library. Everything it needs
//! from one is captured by [`MapRenderer`]; [`InMemoryMap`] is a faithful
//! recording implementation used by the shell and in tests.

use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RenderError;
use super::layers::LayerSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Mercator,
    Globe,
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Mercator => write!(f, "mercator"),
            Projection::Globe => write!(f, "globe"),
        }
    }
}

/// Vector tile source registered on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSpec {
    pub id: String,
    pub url: String,
}

pub trait MapRenderer {
    fn has_source(&self, id: &str) -> bool;
    fn add_source(&mut self, source: SourceSpec) -> Result<(), RenderError>;

    fn has_layer(&self, id: &str) -> bool;
    /// Insert a layer below `before`, or on top when `before` is `None` or
    /// not present in the current style.
    fn add_layer(&mut self, layer: LayerSpec, before: Option<&str>) -> Result<(), RenderError>;

    /// Replace a layer's filter; `None` clears it.
    fn set_filter(&mut self, id: &str, filter: Option<Value>) -> Result<(), RenderError>;
    fn filter(&self, id: &str) -> Option<Value>;

    fn set_layout_property(&mut self, id: &str, name: &str, value: Value)
    -> Result<(), RenderError>;
    fn layout_property(&self, id: &str, name: &str) -> Option<Value>;

    fn zoom(&self) -> f64;
    fn set_zoom(&mut self, zoom: f64);

    fn projection(&self) -> Projection;
    fn set_projection(&mut self, projection: Projection) -> Result<(), RenderError>;

    /// Swap the base style. Custom sources and layers do not survive this.
    fn set_style(&mut self, url: &str);
    fn style(&self) -> &str;
}

#[derive(Debug, Clone)]
struct LayerEntry {
    spec: LayerSpec,
    filter: Option<Value>,
    layout: serde_json::Map<String, Value>,
}

/// Renderer that keeps the style in memory and records every filter write.
#[derive(Debug, Clone)]
pub struct InMemoryMap {
    style: String,
    basemap_layers: Vec<String>,
    sources: HashMap<String, SourceSpec>,
    layers: HashMap<String, LayerEntry>,
    /// Draw order, bottom first
    order: Vec<String>,
    zoom: f64,
    projection: Projection,
    supports_globe: bool,
    filter_writes: usize,
}

impl InMemoryMap {
    /// A map with the given base style; `basemap_layers` are the style's own
    /// layer IDs (e.g. `"Village labels"`).
    pub fn new(style: impl Into<String>, basemap_layers: &[&str]) -> Self {
        let basemap_layers: Vec<String> = basemap_layers.iter().map(|s| s.to_string()).collect();
        Self {
            style: style.into(),
            order: basemap_layers.clone(),
            basemap_layers,
            sources: HashMap::new(),
            layers: HashMap::new(),
            zoom: 2.1,
            projection: Projection::Mercator,
            supports_globe: true,
            filter_writes: 0,
        }
    }

    /// Renderer that rejects the globe projection.
    pub fn without_globe(mut self) -> Self {
        self.supports_globe = false;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Layer IDs in draw order, bottom first.
    pub fn layer_order(&self) -> &[String] {
        &self.order
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.get(id).map(|entry| &entry.spec)
    }

    pub fn source(&self, id: &str) -> Option<&SourceSpec> {
        self.sources.get(id)
    }

    /// Number of `set_filter` calls that reached an existing layer.
    pub fn filter_writes(&self) -> usize {
        self.filter_writes
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut LayerEntry, RenderError> {
        self.layers.get_mut(id).ok_or_else(|| RenderError::UnknownLayer { id: id.to_string() })
    }
}

impl MapRenderer for InMemoryMap {
    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_source(&mut self, source: SourceSpec) -> Result<(), RenderError> {
        self.sources.insert(source.id.clone(), source);
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id) || self.basemap_layers.iter().any(|l| l == id)
    }

    fn add_layer(&mut self, layer: LayerSpec, before: Option<&str>) -> Result<(), RenderError> {
        if self.has_layer(&layer.id) {
            return Err(RenderError::DuplicateLayer { id: layer.id });
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(RenderError::UnknownSource { id: layer.source });
        }

        let position = before
            .and_then(|b| self.order.iter().position(|id| id == b))
            .unwrap_or(self.order.len());
        self.order.insert(position, layer.id.clone());

        let layout = match &layer.layout {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        self.layers.insert(
            layer.id.clone(),
            LayerEntry {
                filter: layer.filter.clone(),
                spec: layer,
                layout,
            },
        );
        Ok(())
    }

    fn set_filter(&mut self, id: &str, filter: Option<Value>) -> Result<(), RenderError> {
        let entry = self.entry_mut(id)?;
        entry.filter = filter;
        self.filter_writes += 1;
        Ok(())
    }

    fn filter(&self, id: &str) -> Option<Value> {
        self.layers.get(id).and_then(|entry| entry.filter.clone())
    }

    fn set_layout_property(
        &mut self,
        id: &str,
        name: &str,
        value: Value,
    ) -> Result<(), RenderError> {
        let entry = self.entry_mut(id)?;
        entry.layout.insert(name.to_string(), value);
        Ok(())
    }

    fn layout_property(&self, id: &str, name: &str) -> Option<Value> {
        self.layers
            .get(id)
            .and_then(|entry| entry.layout.get(name).cloned())
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    fn projection(&self) -> Projection {
        self.projection
    }

    fn set_projection(&mut self, projection: Projection) -> Result<(), RenderError> {
        if projection == Projection::Globe && !self.supports_globe {
            return Err(RenderError::UnsupportedProjection { projection });
        }
        self.projection = projection;
        Ok(())
    }

    fn set_style(&mut self, url: &str) {
        self.style = url.to_string();
        self.sources.clear();
        self.layers.clear();
        self.order = self.basemap_layers.clone();
    }

    fn style(&self) -> &str {
        &self.style
    }
}
