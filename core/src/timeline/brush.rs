//! Brush state machine.
//!
//! Gestures arrive in chart pixel coordinates and leave as [`TimeRange`]s.
//! Methods that may change the highlighted interval return the range the
//! coordinator should commit; `None` means nothing changed.

use ymdash_types::{TimeRange, TimelineConfig};

use super::TimelinePoint;
use super::keys::BrushKey;
use super::render::{self, DrawCommand, MARGIN_BOTTOM, MARGIN_TOP};
use super::scale::TimeScale;
use super::surface::TimelineSurface;

const SECS_PER_DAY: f64 = 86_400.0;
/// Key moves smaller than this are treated as no-ops.
const PX_EPSILON: f64 = 1e-6;

/// Highlighted interval in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushInterval {
    pub start: f64,
    pub end: f64,
}

impl BrushInterval {
    fn from_px(scale: &TimeScale, left: f64, right: f64) -> Self {
        Self {
            start: scale.invert(left),
            end: scale.invert(right),
        }
    }

    fn to_px(self, scale: &TimeScale) -> (f64, f64) {
        (scale.to_px(self.start), scale.to_px(self.end))
    }

    fn from_range(range: TimeRange) -> Self {
        Self {
            start: range.start as f64,
            end: range.end as f64,
        }
    }

    pub fn to_range(self) -> TimeRange {
        TimeRange::new(self.start.floor() as i64, self.end.floor() as i64)
    }
}

/// Which part of an existing span a drag grabbed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragHandle {
    Move { grab_offset: f64 },
    ResizeStart,
    ResizeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanDrag {
    pub handle: DragHandle,
    /// Interval when the drag began
    pub origin: BrushInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BrushState {
    #[default]
    Idle,
    Selecting {
        origin: f64,
        current: f64,
        dragging: bool,
        previous: Option<BrushInterval>,
    },
    Selected {
        interval: BrushInterval,
        drag: Option<SpanDrag>,
    },
}

pub struct BrushController {
    config: TimelineConfig,
    series: Vec<TimelinePoint>,
    bucket_secs: f64,
    width: f64,
    height: f64,
    sized: bool,
    state: BrushState,
    listening: bool,
}

impl BrushController {
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            series: Vec::new(),
            bucket_secs: SECS_PER_DAY,
            width: 0.0,
            height: 0.0,
            sized: false,
            state: BrushState::Idle,
            listening: false,
        }
    }

    pub fn state(&self) -> &BrushState {
        &self.state
    }

    pub fn series(&self) -> &[TimelinePoint] {
        &self.series
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn chart_width(&self) -> f64 {
        self.width
    }

    pub fn chart_height(&self) -> f64 {
        (self.height - MARGIN_TOP - MARGIN_BOTTOM).max(0.0)
    }

    /// First and last bucket times, or `None` for an empty series.
    pub fn domain(&self) -> Option<(i64, i64)> {
        let first = self.series.first()?;
        let last = self.series.last()?;
        Some((first.at, last.at))
    }

    pub fn full_extent(&self) -> Option<TimeRange> {
        self.domain().map(|(start, end)| TimeRange::new(start, end))
    }

    fn scale(&self) -> Option<TimeScale> {
        let (start, end) = self.domain()?;
        Some(TimeScale::new((start as f64, end as f64), self.chart_width()))
    }

    /// Committed interval, if any.
    pub fn interval(&self) -> Option<TimeRange> {
        match self.state {
            BrushState::Selected { interval, .. } => Some(interval.to_range()),
            _ => None,
        }
    }

    /// Pixel extent of the highlighted span, including one being drawn.
    pub fn interval_px(&self) -> Option<(f64, f64)> {
        let scale = self.scale()?;
        match self.state {
            BrushState::Selecting {
                origin,
                current,
                dragging: true,
                ..
            } => {
                let (l, r) = (origin.min(current), origin.max(current));
                (r - l > self.config.min_brush_px).then_some((l, r))
            }
            BrushState::Selected { interval, .. } => {
                let (l, r) = interval.to_px(&scale);
                let (l, r) = (scale.clamp_px(l), scale.clamp_px(r));
                (r > l).then_some((l, r))
            }
            _ => None,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    // ─────────────────────────────────────────────────────────────────────
    // Data and layout
    // ─────────────────────────────────────────────────────────────────────

    /// Replace the plotted series. A committed interval is kept in the time
    /// domain, even across an empty series where it is simply not drawn. A
    /// gesture in progress is abandoned when the series empties.
    pub fn set_series(&mut self, mut points: Vec<TimelinePoint>) {
        points.sort_by_key(|p| p.at);
        self.bucket_secs = native_bucket_secs(&points);
        self.series = points;

        if self.series.is_empty() {
            self.state = match self.state {
                BrushState::Selected { interval, .. } => BrushState::Selected {
                    interval,
                    drag: None,
                },
                _ => BrushState::Idle,
            };
        }
        tracing::debug!(
            points = self.series.len(),
            bucket_secs = self.bucket_secs,
            "Timeline series replaced"
        );
    }

    /// Apply a new container size. Returns `false` when both dimensions moved by
    /// less than the redraw tolerance.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let tolerance = self.config.redraw_tolerance_px;
        if self.sized
            && (width - self.width).abs() < tolerance
            && (height - self.height).abs() < tolerance
        {
            return false;
        }
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.sized = true;
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pointer gestures
    // ─────────────────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f64, surface: &mut dyn TimelineSurface) {
        let Some(scale) = self.scale() else {
            return;
        };
        let x = scale.clamp_px(x);

        self.state = match self.state {
            BrushState::Selected { interval, .. } => {
                let (l, r) = interval.to_px(&scale);
                match hit_test(x, l, r, self.config.edge_handle_px) {
                    Some(handle) => BrushState::Selected {
                        interval,
                        drag: Some(SpanDrag {
                            handle,
                            origin: interval,
                        }),
                    },
                    None => BrushState::Selecting {
                        origin: x,
                        current: x,
                        dragging: false,
                        previous: Some(interval),
                    },
                }
            }
            _ => BrushState::Selecting {
                origin: x,
                current: x,
                dragging: false,
                previous: None,
            },
        };
        self.listen(surface);
    }

    pub fn pointer_move(&mut self, x: f64) -> Option<TimeRange> {
        let scale = self.scale()?;
        let x = scale.clamp_px(x);
        let min_width = self.config.min_brush_px;
        let threshold = self.config.drag_threshold_px;

        match &mut self.state {
            BrushState::Selecting {
                origin,
                current,
                dragging,
                ..
            } => {
                *current = x;
                if !*dragging && (x - *origin).abs() > threshold {
                    *dragging = true;
                }
                if !*dragging {
                    return None;
                }
                let (l, r) = (origin.min(x), origin.max(x));
                (r - l > min_width).then(|| BrushInterval::from_px(&scale, l, r).to_range())
            }
            BrushState::Selected {
                interval,
                drag: Some(drag),
            } => {
                let (l, r) = interval.to_px(&scale);
                let (nl, nr) = match drag.handle {
                    DragHandle::Move { grab_offset } => {
                        let width = r - l;
                        let nl = (x - grab_offset).clamp(0.0, (scale.width - width).max(0.0));
                        (nl, nl + width)
                    }
                    DragHandle::ResizeStart => (x.min(r - min_width).max(0.0), r),
                    DragHandle::ResizeEnd => (l, x.max(l + min_width).min(scale.width)),
                };
                let next = BrushInterval::from_px(&scale, nl, nr);
                if next == *interval {
                    return None;
                }
                *interval = next;
                Some(next.to_range())
            }
            _ => None,
        }
    }

    pub fn pointer_up(&mut self, x: f64, surface: &mut dyn TimelineSurface) -> Option<TimeRange> {
        self.release(surface);
        let scale = self.scale()?;
        let state = std::mem::take(&mut self.state);
        let x = scale.clamp_px(x);

        match state {
            BrushState::Selecting {
                origin,
                dragging: true,
                ..
            } => {
                let (l, r) = self.widen(&scale, origin.min(x), origin.max(x));
                let interval = BrushInterval::from_px(&scale, l, r);
                self.state = BrushState::Selected {
                    interval,
                    drag: None,
                };
                Some(interval.to_range())
            }
            BrushState::Selecting {
                previous: Some(_), ..
            } => {
                tracing::debug!("Click outside brush, clearing selection");
                self.full_extent()
            }
            BrushState::Selecting { origin, .. } => {
                let width = self.default_width(&scale);
                let (l, r) = fit(origin - width / 2.0, width, scale.width);
                let interval = BrushInterval::from_px(&scale, l, r);
                self.state = BrushState::Selected {
                    interval,
                    drag: None,
                };
                Some(interval.to_range())
            }
            BrushState::Selected { interval, drag } => {
                self.state = BrushState::Selected {
                    interval,
                    drag: None,
                };
                match drag {
                    Some(drag) if drag.origin != interval => Some(interval.to_range()),
                    _ => None,
                }
            }
            BrushState::Idle => None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Keyboard
    // ─────────────────────────────────────────────────────────────────────

    pub fn key(&mut self, key: BrushKey, surface: &mut dyn TimelineSurface) -> Option<TimeRange> {
        if key == BrushKey::Reset {
            return self.escape(surface);
        }

        let scale = self.scale()?;
        let step = self.step_px(&scale);
        let fraction = self.config.key_resize_fraction;
        let BrushState::Selected { interval, drag } = self.state else {
            return None;
        };

        let (l, r) = interval.to_px(&scale);
        let width = r - l;
        let (nl, nr) = match key {
            BrushKey::Left => {
                let nl = (l - step).max(0.0);
                (nl, nl + width)
            }
            BrushKey::Right => {
                let nl = (l + step).min((scale.width - width).max(0.0));
                (nl, nl + width)
            }
            BrushKey::Grow => (l, (r + width * fraction).min(scale.width).max(r)),
            BrushKey::Shrink => {
                let floor = l + 2.0 * step;
                (l, (r - width * fraction).max(floor).min(r))
            }
            BrushKey::Reset => return self.escape(surface),
        };

        if (nl - l).abs() < PX_EPSILON && (nr - r).abs() < PX_EPSILON {
            return None;
        }
        let next = BrushInterval::from_px(&scale, nl, nr);
        self.state = BrushState::Selected {
            interval: next,
            drag,
        };
        Some(next.to_range())
    }

    /// Cancel any gesture and clear the span. Emits the full extent. Without
    /// data there is no extent to fall back to, so the span is left alone.
    pub fn escape(&mut self, surface: &mut dyn TimelineSurface) -> Option<TimeRange> {
        self.release(surface);
        let extent = self.full_extent()?;
        self.state = BrushState::Idle;
        Some(extent)
    }

    /// Show a range committed by something other than a gesture. Cancels any
    /// gesture in progress and emits nothing.
    pub fn set_interval(&mut self, range: Option<TimeRange>, surface: &mut dyn TimelineSurface) {
        self.release(surface);
        self.state = match range {
            Some(range) => BrushState::Selected {
                interval: BrushInterval::from_range(range),
                drag: None,
            },
            None => BrushState::Idle,
        };
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────

    /// Frame for the current series, size and span. Empty when there is no
    /// data or no room to draw.
    pub fn render(&self) -> Vec<DrawCommand> {
        let Some(scale) = self.scale() else {
            return Vec::new();
        };
        let height = self.chart_height();
        if scale.width <= 0.0 || height <= 0.0 {
            return Vec::new();
        }

        let mut commands = vec![
            DrawCommand::Axis {
                ticks: render::axis_ticks(&scale, render::tick_count(scale.width)),
                baseline: height,
            },
            DrawCommand::Area {
                points: render::area_points(&self.series, &scale, height),
                baseline: height,
            },
        ];
        if let Some((l, r)) = self.interval_px() {
            commands.push(DrawCommand::Brush {
                x: l,
                width: r - l,
                height,
            });
        }
        commands
    }

    pub fn redraw(&self, surface: &mut dyn TimelineSurface) {
        surface.draw(&self.render());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────

    fn listen(&mut self, surface: &mut dyn TimelineSurface) {
        if !self.listening {
            surface.install_drag_listeners();
            self.listening = true;
        }
    }

    fn release(&mut self, surface: &mut dyn TimelineSurface) {
        if self.listening {
            surface.remove_drag_listeners();
            self.listening = false;
        }
    }

    fn default_width(&self, scale: &TimeScale) -> f64 {
        (scale.width * self.config.default_brush_fraction).min(self.config.default_brush_cap_px)
    }

    fn step_px(&self, scale: &TimeScale) -> f64 {
        (scale.width * self.config.key_step_fraction).max(scale.secs_to_px(self.bucket_secs))
    }

    /// Grow a degenerate span to the minimum brush width around its center.
    fn widen(&self, scale: &TimeScale, l: f64, r: f64) -> (f64, f64) {
        let min_width = self.config.min_brush_px;
        if r - l >= min_width {
            return (l, r);
        }
        let center = (l + r) / 2.0;
        fit(center - min_width / 2.0, min_width, scale.width)
    }
}

/// Place a span of `width` starting near `left` fully inside `[0, extent]`.
fn fit(left: f64, width: f64, extent: f64) -> (f64, f64) {
    let width = width.min(extent).max(0.0);
    let left = left.clamp(0.0, extent - width);
    (left, left + width)
}

fn hit_test(x: f64, l: f64, r: f64, handle: f64) -> Option<DragHandle> {
    if x < l - handle || x > r + handle {
        return None;
    }
    let to_start = (x - l).abs();
    let to_end = (x - r).abs();
    match (to_start <= handle, to_end <= handle) {
        (true, true) if to_start <= to_end => Some(DragHandle::ResizeStart),
        (true, true) => Some(DragHandle::ResizeEnd),
        (true, false) => Some(DragHandle::ResizeStart),
        (false, true) => Some(DragHandle::ResizeEnd),
        (false, false) => Some(DragHandle::Move {
            grab_offset: x - l,
        }),
    }
}

/// Smallest positive gap between consecutive points; one day when there is none.
fn native_bucket_secs(points: &[TimelinePoint]) -> f64 {
    points
        .windows(2)
        .map(|w| w[1].at - w[0].at)
        .filter(|gap| *gap > 0)
        .min()
        .map(|gap| gap as f64)
        .unwrap_or(SECS_PER_DAY)
}
