//! Activity timeline with a brushable time interval.

mod brush;
mod debounce;
mod keys;
mod render;
mod scale;
mod surface;

#[cfg(test)]
mod brush_tests;

pub use brush::{BrushController, BrushInterval, BrushState, DragHandle, SpanDrag};
pub use debounce::ResizeDebouncer;
pub use keys::BrushKey;
pub use render::{AxisTick, DrawCommand, MARGIN_BOTTOM, MARGIN_TOP, tick_count};
pub use scale::TimeScale;
pub use surface::{RecordingSurface, TimelineSurface};

use serde::Serialize;
use ymdash_types::AggregatedBucket;

/// One plotted point: bucket start and its smoothed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub at: i64,
    pub value: f64,
}

impl From<&AggregatedBucket> for TimelinePoint {
    fn from(bucket: &AggregatedBucket) -> Self {
        Self {
            at: bucket.bucket_epoch(),
            value: bucket.rolling_value,
        }
    }
}

pub fn timeline_series(buckets: &[AggregatedBucket]) -> Vec<TimelinePoint> {
    buckets.iter().map(TimelinePoint::from).collect()
}
