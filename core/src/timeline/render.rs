//! Draw command generation for the activity timeline.

use chrono::DateTime;
use serde::Serialize;

use super::TimelinePoint;
use super::scale::TimeScale;

pub const MARGIN_TOP: f64 = 2.0;
pub const MARGIN_BOTTOM: f64 = 15.0;

/// Charts narrower than this get fewer axis ticks.
const NARROW_CHART_PX: f64 = 300.0;
/// Upper bound of the y axis when every value is zero.
const EMPTY_Y_MAX: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub x: f64,
    pub at: i64,
    pub label: String,
}

/// One primitive of a timeline frame. Coordinates are relative to the chart
/// area; the surface applies the margins.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Axis { ticks: Vec<AxisTick>, baseline: f64 },
    Area { points: Vec<(f64, f64)>, baseline: f64 },
    Brush { x: f64, width: f64, height: f64 },
}

pub fn tick_count(chart_width: f64) -> usize {
    if chart_width < NARROW_CHART_PX { 3 } else { 5 }
}

pub(crate) fn axis_ticks(scale: &TimeScale, count: usize) -> Vec<AxisTick> {
    let (d0, d1) = scale.domain;
    if count == 0 {
        return Vec::new();
    }
    if count == 1 || d1 <= d0 {
        return vec![tick_at(scale, d0)];
    }

    let step = (d1 - d0) / (count - 1) as f64;
    (0..count)
        .map(|i| tick_at(scale, d0 + step * i as f64))
        .collect()
}

fn tick_at(scale: &TimeScale, t: f64) -> AxisTick {
    let at = t.floor() as i64;
    let label = DateTime::from_timestamp(at, 0)
        .map(|dt| dt.format("%b %Y").to_string())
        .unwrap_or_default();
    AxisTick {
        x: scale.to_px(t),
        at,
        label,
    }
}

/// Area outline in chart coordinates; y grows downward from the top margin.
pub(crate) fn area_points(series: &[TimelinePoint], scale: &TimeScale, height: f64) -> Vec<(f64, f64)> {
    let max = series
        .iter()
        .map(|p| p.value)
        .fold(0.0_f64, f64::max);
    let y_max = if max > 0.0 { max } else { EMPTY_Y_MAX };

    series
        .iter()
        .map(|p| {
            let x = scale.to_px(p.at as f64);
            let y = height - (p.value / y_max) * height;
            (x, y)
        })
        .collect()
}
