//! On-map toggle buttons.

use std::time::{Duration, Instant};

use serde_json::json;
use ymdash_types::MapConfig;

use super::layers::{StyleVariant, VISIBILITY};
use super::renderer::{MapRenderer, Projection};

/// How long the "not supported" notice stays on the globe button.
const NOTICE_DURATION: Duration = Duration::from_secs(2);
/// Zoom the globe view is capped to when entered.
const GLOBE_MAX_ZOOM: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlButton {
    pub label: &'static str,
    pub title: &'static str,
}

/// What a click did to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Unchanged,
    Updated,
    /// The base style was swapped; activity layers must be reinstalled.
    StyleReplaced,
}

/// Button attached to the map chrome.
pub trait MapControl {
    fn name(&self) -> &'static str;
    /// Attach to `map` and sync state from it.
    fn on_add(&mut self, map: &dyn MapRenderer) -> ControlButton;
    fn on_remove(&mut self);
    fn is_attached(&self) -> bool;
    fn on_click(&mut self, map: &mut dyn MapRenderer, now: Instant) -> ControlOutcome;
    fn button(&self, now: Instant) -> ControlButton;
}

// ─────────────────────────────────────────────────────────────────────────────
// Bounding boxes
// ─────────────────────────────────────────────────────────────────────────────

/// Shows or hides the bounding box outline layer.
#[derive(Debug, Clone)]
pub struct BboxToggle {
    layer_id: String,
    visible: bool,
    attached: bool,
}

impl BboxToggle {
    pub fn new(layer_id: impl Into<String>) -> Self {
        Self {
            layer_id: layer_id.into(),
            visible: true,
            attached: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl MapControl for BboxToggle {
    fn name(&self) -> &'static str {
        "bbox"
    }

    fn on_add(&mut self, map: &dyn MapRenderer) -> ControlButton {
        self.attached = true;
        if let Some(value) = map.layout_property(&self.layer_id, VISIBILITY) {
            self.visible = value != json!("none");
        }
        self.button(Instant::now())
    }

    fn on_remove(&mut self) {
        self.attached = false;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn on_click(&mut self, map: &mut dyn MapRenderer, _now: Instant) -> ControlOutcome {
        if !self.attached {
            return ControlOutcome::Unchanged;
        }
        if !map.has_layer(&self.layer_id) {
            tracing::warn!(layer = %self.layer_id, "Bounding boxes layer not found");
            return ControlOutcome::Unchanged;
        }

        let visible = !self.visible;
        let value = if visible { "visible" } else { "none" };
        match map.set_layout_property(&self.layer_id, VISIBILITY, json!(value)) {
            Ok(()) => {
                self.visible = visible;
                ControlOutcome::Updated
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to toggle bounding boxes");
                ControlOutcome::Unchanged
            }
        }
    }

    fn button(&self, _now: Instant) -> ControlButton {
        if self.visible {
            ControlButton {
                label: "📦",
                title: "Hide Bounding Boxes",
            }
        } else {
            ControlButton {
                label: "📋",
                title: "Show Bounding Boxes",
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Globe projection
// ─────────────────────────────────────────────────────────────────────────────

/// Switches between flat and globe projections.
#[derive(Debug, Clone, Default)]
pub struct GlobeToggle {
    globe: bool,
    attached: bool,
    notice_until: Option<Instant>,
}

impl GlobeToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_globe(&self) -> bool {
        self.globe
    }
}

impl MapControl for GlobeToggle {
    fn name(&self) -> &'static str {
        "globe"
    }

    fn on_add(&mut self, map: &dyn MapRenderer) -> ControlButton {
        self.attached = true;
        self.globe = map.projection() == Projection::Globe;
        self.button(Instant::now())
    }

    fn on_remove(&mut self) {
        self.attached = false;
        self.notice_until = None;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn on_click(&mut self, map: &mut dyn MapRenderer, now: Instant) -> ControlOutcome {
        if !self.attached {
            return ControlOutcome::Unchanged;
        }

        let target = if self.globe {
            Projection::Mercator
        } else {
            Projection::Globe
        };
        if let Err(e) = map.set_projection(target) {
            tracing::warn!(error = %e, "Globe projection not supported");
            self.notice_until = Some(now + NOTICE_DURATION);
            return ControlOutcome::Unchanged;
        }

        self.globe = target == Projection::Globe;
        if self.globe && map.zoom() > GLOBE_MAX_ZOOM {
            map.set_zoom(GLOBE_MAX_ZOOM);
        }
        ControlOutcome::Updated
    }

    fn button(&self, now: Instant) -> ControlButton {
        match self.notice_until {
            Some(until) if now < until => ControlButton {
                label: "❌",
                title: "Globe view not supported by this renderer",
            },
            _ if self.globe => ControlButton {
                label: "🗺️",
                title: "Switch to Flat Map",
            },
            _ => ControlButton {
                label: "🌍",
                title: "Switch to Globe View",
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Base style
// ─────────────────────────────────────────────────────────────────────────────

/// Switches the base map between the light and dark styles.
#[derive(Debug, Clone)]
pub struct StyleToggle {
    config: MapConfig,
    variant: StyleVariant,
    attached: bool,
}

impl StyleToggle {
    pub fn new(config: MapConfig) -> Self {
        let variant = StyleVariant::from_config(&config);
        Self {
            config,
            variant,
            attached: false,
        }
    }

    pub fn variant(&self) -> StyleVariant {
        self.variant
    }
}

impl MapControl for StyleToggle {
    fn name(&self) -> &'static str {
        "style"
    }

    fn on_add(&mut self, map: &dyn MapRenderer) -> ControlButton {
        self.attached = true;
        if map.style() == self.config.dark_style_url {
            self.variant = StyleVariant::Dark;
        } else if map.style() == self.config.light_style_url {
            self.variant = StyleVariant::Light;
        }
        self.button(Instant::now())
    }

    fn on_remove(&mut self) {
        self.attached = false;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn on_click(&mut self, map: &mut dyn MapRenderer, _now: Instant) -> ControlOutcome {
        if !self.attached {
            return ControlOutcome::Unchanged;
        }
        self.variant = self.variant.toggled();
        map.set_style(self.variant.url(&self.config));
        tracing::debug!(variant = ?self.variant, "Base style switched");
        ControlOutcome::StyleReplaced
    }

    fn button(&self, _now: Instant) -> ControlButton {
        match self.variant {
            StyleVariant::Light => ControlButton {
                label: "🌙",
                title: "Switch to Dark Map",
            },
            StyleVariant::Dark => ControlButton {
                label: "☀️",
                title: "Switch to Light Map",
            },
        }
    }
}
