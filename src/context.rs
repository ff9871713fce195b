use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use ymdash_core::config::DashboardConfigExt;
use ymdash_core::map::StyleVariant;
use ymdash_core::{Dashboard, DashboardConfig, InMemoryMap, RecordingSurface};

/// Timeline size until a `resize` command arrives.
const TIMELINE_SIZE: (f64, f64) = (960.0, 120.0);

/// Dashboard driven by the shell: an in-memory map and a recording timeline.
pub type ShellDashboard = Dashboard<InMemoryMap, RecordingSurface>;

/// Shared state for the shell. Logic lives in [`Dashboard`]; this only holds
/// handles.
#[derive(Clone)]
pub struct ReplContext {
    pub config: Arc<RwLock<DashboardConfig>>,
    pub dashboard: Arc<Mutex<ShellDashboard>>,
}

impl ReplContext {
    pub fn new() -> Self {
        Self::with_config(DashboardConfig::load())
    }

    pub fn with_config(config: DashboardConfig) -> Self {
        let dashboard = build_dashboard(config.clone());
        Self {
            config: Arc::new(RwLock::new(config)),
            dashboard: Arc::new(Mutex::new(dashboard)),
        }
    }
}

impl Default for ReplContext {
    fn default() -> Self {
        Self::new()
    }
}

fn build_dashboard(config: DashboardConfig) -> ShellDashboard {
    let style = StyleVariant::from_config(&config.map).url(&config.map).to_string();
    let map = InMemoryMap::new(style, &[config.map.insert_below.as_str()]).with_zoom(config.map.zoom);
    let mut dashboard = Dashboard::new(config, map, RecordingSurface::new());
    dashboard.resize(TIMELINE_SIZE.0, TIMELINE_SIZE.1);
    dashboard
}
