//! Dashboard configuration
//!
//! Re-exports the shared config types from ymdash-types and adds persistence
//! through confy.

mod error;

pub use error::ConfigError;
pub use ymdash_types::{
    DashboardConfig, DataConfig, LabelTier, MapConfig, OutlineTier, ResolutionTier,
    TilesetConfig, TimelineConfig,
};

use std::path::{Path, PathBuf};

const APP_NAME: &str = "ymdash";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// DashboardConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for DashboardConfig persistence and validation
pub trait DashboardConfigExt: Sized {
    /// Load from the platform config directory, falling back to defaults.
    fn load() -> Self;
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn save_to(&self, path: &Path) -> Result<(), ConfigError>;
    fn config_path() -> Result<PathBuf, ConfigError>;
    fn validate(&self) -> Result<(), ConfigError>;
}

impl DashboardConfigExt for DashboardConfig {
    fn load() -> Self {
        let config: Self = match confy::load(APP_NAME, CONFIG_NAME) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load configuration, using defaults");
                return Self::default();
            }
        };
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid configuration, using defaults");
                Self::default()
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = confy::load_path(path)?;
        config.validate()?;
        Ok(config)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self.clone()).map_err(ConfigError::Save)
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        confy::store_path(path, self.clone()).map_err(ConfigError::Save)
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        let t = &self.timeline;

        if t.rolling_window == 0 {
            return invalid("timeline.rolling_window", "must be at least 1");
        }
        if !(t.default_brush_fraction > 0.0 && t.default_brush_fraction <= 1.0) {
            return invalid("timeline.default_brush_fraction", "must be in (0, 1]");
        }
        if !(t.key_step_fraction > 0.0 && t.key_step_fraction <= 1.0) {
            return invalid("timeline.key_step_fraction", "must be in (0, 1]");
        }
        if !(t.key_resize_fraction > 0.0 && t.key_resize_fraction < 1.0) {
            return invalid("timeline.key_resize_fraction", "must be in (0, 1)");
        }
        if t.min_brush_px <= 0.0 || t.default_brush_cap_px < t.min_brush_px {
            return invalid(
                "timeline.min_brush_px",
                "must be positive and no larger than the default brush cap",
            );
        }
        if self.tiles.tiers.is_empty() {
            return invalid("tiles.tiers", "at least one resolution tier is required");
        }
        if let Some(tier) = self.tiles.tiers.iter().find(|t| t.min_zoom >= t.max_zoom) {
            return invalid(
                "tiles.tiers",
                &format!("tier {} has min_zoom >= max_zoom", tier.id),
            );
        }
        if self.map.min_zoom > self.map.max_zoom {
            return invalid("map.min_zoom", "must not exceed map.max_zoom");
        }
        Ok(())
    }
}
