pub mod aggregate;
pub mod chapters;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod filter;
pub mod map;
pub mod timeline;

pub use ymdash_types as types;

// Re-exports for convenience
pub use aggregate::{ActivitySummary, TemporalAggregator, aggregate, rolling_mean, summarize};
pub use chapters::{ChapterRoster, ChapterSearch};
pub use config::{ConfigError, DashboardConfigExt};
pub use dashboard::{Dashboard, LoadState};
pub use data::{DataOrigin, DatasetManifest, LoadError, LoadReport, WeeklyDataset};
pub use filter::{CompiledFilter, Predicate, compile, compile_raw};
pub use map::{InMemoryMap, LayerController, MapControl, MapRenderer, RenderError};
pub use timeline::{BrushController, BrushKey, BrushState, RecordingSurface, TimelineSurface};
pub use ymdash_types::{
    ActivityRecord, AggregatedBucket, Chapter, ChapterId, ChapterSet, DashboardConfig,
    SelectionState, TimeRange, WeeklyChapterRecord,
};
