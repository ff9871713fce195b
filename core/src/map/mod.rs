//! Map layers, the renderer seam and on-map controls.

mod controller;
mod controls;
mod error;
mod layers;
mod renderer;


pub use controller::LayerController;
pub use controls::{BboxToggle, ControlButton, ControlOutcome, GlobeToggle, MapControl, StyleToggle};
pub use error::RenderError;
pub use layers::{
    LayerKind, LayerSpec, StyleVariant, VISIBILITY, heatmap_layer, label_layer, layer_specs,
    outline_layer, tileset_sources, tileset_url,
};
pub use renderer::{InMemoryMap, MapRenderer, Projection, SourceSpec};
