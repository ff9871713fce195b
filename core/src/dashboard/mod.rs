//! Selection coordinator.
//!
//! [`Dashboard`] is the single owner of [`SelectionState`]. The timeline and
//! the chapter search only propose new values; the dashboard commits them,
//! recompiles the filter and pushes it to every map layer.


use std::time::Instant;

use ymdash_types::{
    AggregatedBucket, ChapterId, ChapterSet, DashboardConfig, SelectionState, TimeRange,
};

use crate::aggregate::{ActivitySummary, TemporalAggregator, summarize};
use crate::chapters::{ChapterRoster, ChapterSearch};
use crate::data::{DataOrigin, DatasetManifest, WeeklyDataset};
use crate::filter::{CompiledFilter, canonicalize_ids, compile};
use crate::map::{
    BboxToggle, ControlButton, ControlOutcome, GlobeToggle, LayerController, MapControl,
    MapRenderer, StyleToggle,
};
use crate::timeline::{
    BrushController, BrushKey, ResizeDebouncer, TimelineSurface, timeline_series,
};

/// Which datasets have been installed, and from where.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadState {
    pub weekly: Option<DataOrigin>,
    pub roster: Option<DataOrigin>,
}

impl LoadState {
    pub fn is_loaded(&self) -> bool {
        self.weekly.is_some() && self.roster.is_some()
    }

    /// Whether any installed dataset is synthetic.
    pub fn uses_fallback(&self) -> bool {
        self.weekly == Some(DataOrigin::Fallback) || self.roster == Some(DataOrigin::Fallback)
    }
}

pub struct Dashboard<M: MapRenderer, S: TimelineSurface> {
    config: DashboardConfig,
    selection: SelectionState,
    compiled: Option<CompiledFilter>,
    aggregator: TemporalAggregator,
    timeline: BrushController,
    resize_debouncer: ResizeDebouncer,
    layers: LayerController,
    controls: Vec<Box<dyn MapControl>>,
    roster: ChapterRoster,
    search: ChapterSearch,
    load_state: LoadState,
    map: M,
    surface: S,
}

impl<M: MapRenderer, S: TimelineSurface> Dashboard<M, S> {
    pub fn new(config: DashboardConfig, map: M, surface: S) -> Self {
        let aggregator = TemporalAggregator::new(Vec::new(), config.timeline.rolling_window);
        let timeline = BrushController::new(config.timeline.clone());
        let resize_debouncer = ResizeDebouncer::from_millis(config.timeline.resize_debounce_ms);
        let layers = LayerController::new(config.tiles.clone());

        let mut controls: Vec<Box<dyn MapControl>> = vec![
            Box::new(BboxToggle::new(config.tiles.outline.id.clone())),
            Box::new(GlobeToggle::new()),
            Box::new(StyleToggle::new(config.map.clone())),
        ];
        for control in &mut controls {
            control.on_add(&map);
        }

        Self {
            config,
            selection: SelectionState::default(),
            compiled: None,
            aggregator,
            timeline,
            resize_debouncer,
            layers,
            controls,
            roster: ChapterRoster::default(),
            search: ChapterSearch::new(),
            load_state: LoadState::default(),
            map,
            surface,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Filter currently applied to the map layers.
    pub fn compiled_filter(&self) -> Option<&CompiledFilter> {
        self.compiled.as_ref()
    }

    pub fn timeline(&self) -> &BrushController {
        &self.timeline
    }

    pub fn layers(&self) -> &LayerController {
        &self.layers
    }

    pub fn roster(&self) -> &ChapterRoster {
        &self.roster
    }

    pub fn search(&self) -> &ChapterSearch {
        &self.search
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Aggregated series for the current chapter selection.
    pub fn buckets(&mut self) -> &[AggregatedBucket] {
        self.aggregator.buckets()
    }

    pub fn summary(&mut self) -> Option<ActivitySummary> {
        summarize(self.aggregator.buckets())
    }

    /// Activity layers drawn at the map's current zoom.
    pub fn visible_layers(&self) -> Vec<&str> {
        self.layers.visible_layers(self.map.zoom())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────

    /// Replace the time range, move the brush onto it and re-filter the map.
    pub fn set_time_range(&mut self, time_range: Option<TimeRange>) {
        self.timeline.set_interval(time_range, &mut self.surface);
        self.commit_time_range(time_range);
    }

    fn commit_time_range(&mut self, time_range: Option<TimeRange>) {
        let next = SelectionState {
            time_range,
            chapter_ids: self.selection.chapter_ids.clone(),
        };
        self.commit(next);
    }

    /// Replace the chapter selection, re-aggregate the timeline series and
    /// re-filter the map.
    pub fn set_chapter_ids(&mut self, chapter_ids: ChapterSet) {
        let next = SelectionState {
            time_range: self.selection.time_range,
            chapter_ids,
        };
        self.commit(next);
    }

    /// Chapter IDs as typed into a form; invalid entries are dropped.
    pub fn set_chapter_ids_raw<T: AsRef<str>>(&mut self, chapter_ids: &[T]) {
        self.set_chapter_ids(canonicalize_ids(chapter_ids));
    }

    /// Explicit user reset: no time restriction and no chapter restriction.
    pub fn reset(&mut self) {
        self.timeline.set_interval(None, &mut self.surface);
        self.commit(SelectionState::default());
        tracing::info!("Selection reset");
    }

    /// Compile first, then swap the whole selection in one step.
    fn commit(&mut self, next: SelectionState) {
        let compiled = compile(next.time_range, &next.chapter_ids);

        if self.aggregator.set_chapter_filter(next.chapter_ids.clone()) {
            let series = timeline_series(self.aggregator.buckets());
            self.timeline.set_series(series);
        }
        self.selection = next;
        self.compiled = compiled;
        tracing::debug!(
            range = ?self.selection.time_range,
            chapters = self.selection.chapter_ids.len(),
            "Selection committed"
        );

        self.timeline.redraw(&mut self.surface);
        self.apply_to_map();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Chapter search
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_search_query(&mut self, query: &str) {
        self.search.set_query(query);
    }

    pub fn toggle_chapter(&mut self, id: ChapterId) {
        let next = self.search.toggle(&self.selection.chapter_ids, id);
        self.set_chapter_ids(next);
    }

    /// Select every chapter matching the current search query.
    pub fn select_all_matching(&mut self) {
        let next = self.search.select_all(&self.roster);
        self.set_chapter_ids(next);
    }

    pub fn clear_chapters(&mut self) {
        let next = self.search.clear_all();
        self.set_chapter_ids(next);
    }

    pub fn chapter_label(&self) -> String {
        ChapterSearch::label(&self.selection.chapter_ids)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Datasets
    // ─────────────────────────────────────────────────────────────────────

    /// Install the weekly activity dataset and redraw the timeline.
    pub fn load_weekly(&mut self, dataset: WeeklyDataset) {
        tracing::info!(
            records = dataset.records.len(),
            origin = ?dataset.origin,
            "Installing weekly activity"
        );
        self.aggregator.set_records(dataset.records);
        let series = timeline_series(self.aggregator.buckets());
        self.timeline.set_series(series);
        self.timeline.redraw(&mut self.surface);
        self.load_state.weekly = Some(dataset.origin);
    }

    /// Install the chapter roster and the dataset date, then add the activity
    /// layers to the map.
    pub fn load_roster(&mut self, manifest: DatasetManifest) {
        tracing::info!(
            chapters = manifest.chapters.len(),
            ds = %manifest.ds,
            origin = ?manifest.origin,
            "Installing chapter roster"
        );
        self.roster = ChapterRoster::new(manifest.chapters);
        self.layers.set_dataset_date(manifest.ds);
        self.install_layers();
        self.load_state.roster = Some(manifest.origin);
    }

    fn install_layers(&mut self) {
        let before = self.config.map.insert_below.as_str();
        if let Err(e) = self.layers.install_layers(&mut self.map, Some(before)) {
            tracing::warn!(error = %e, "Failed to install activity layers");
        }
        self.apply_to_map();
    }

    fn apply_to_map(&mut self) {
        if let Err(e) = self.layers.apply_filter(&mut self.map, self.compiled.as_ref()) {
            tracing::warn!(error = %e, "Failed to apply layer filters");
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Timeline gestures
    // ─────────────────────────────────────────────────────────────────────

    /// The brush already shows what it emitted; only the selection follows.
    fn commit_brush(&mut self, emitted: Option<TimeRange>) {
        match emitted {
            Some(range) => self.commit_time_range(Some(range)),
            None => self.timeline.redraw(&mut self.surface),
        }
    }

    pub fn pointer_down(&mut self, x: f64) {
        self.timeline.pointer_down(x, &mut self.surface);
    }

    pub fn pointer_move(&mut self, x: f64) {
        let emitted = self.timeline.pointer_move(x);
        self.commit_brush(emitted);
    }

    pub fn pointer_up(&mut self, x: f64) {
        let emitted = self.timeline.pointer_up(x, &mut self.surface);
        self.commit_brush(emitted);
    }

    pub fn key(&mut self, key: BrushKey) {
        let emitted = self.timeline.key(key, &mut self.surface);
        self.commit_brush(emitted);
    }

    /// Handle a DOM key name. Returns `false` for keys the brush ignores.
    pub fn key_name(&mut self, name: &str) -> bool {
        match BrushKey::from_key_name(name) {
            Some(key) => {
                self.key(key);
                true
            }
            None => false,
        }
    }

    /// Apply a container size immediately. Hosts that receive a stream of
    /// container sizes go through [`request_resize`](Self::request_resize).
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.timeline.resize(width, height) {
            self.timeline.redraw(&mut self.surface);
        }
    }

    /// Queue a container size; applied by [`poll_resize`](Self::poll_resize)
    /// once the debounce window has passed.
    pub fn request_resize(&mut self, width: f64, height: f64, now: Instant) {
        self.resize_debouncer.request(width, height, now);
    }

    /// Returns `true` when a queued resize was applied.
    pub fn poll_resize(&mut self, now: Instant) -> bool {
        match self.resize_debouncer.poll(now) {
            Some((width, height)) => {
                self.resize(width, height);
                true
            }
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Map controls
    // ─────────────────────────────────────────────────────────────────────

    pub fn control_buttons(&self, now: Instant) -> Vec<(&'static str, ControlButton)> {
        self.controls
            .iter()
            .map(|c| (c.name(), c.button(now)))
            .collect()
    }

    /// Click the control named `name`. Returns `None` for an unknown control.
    pub fn click_control(&mut self, name: &str, now: Instant) -> Option<ControlOutcome> {
        let control = self.controls.iter_mut().find(|c| c.name() == name)?;
        let outcome = control.on_click(&mut self.map, now);
        if outcome == ControlOutcome::StyleReplaced && self.load_state.roster.is_some() {
            self.install_layers();
        }
        Some(outcome)
    }
}
