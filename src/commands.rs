use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, offset};
use ymdash_core::config::DashboardConfigExt;
use ymdash_core::data::{self, DataOrigin};
use ymdash_core::map::MapRenderer;
use ymdash_core::{BrushKey, ChapterId, TimeRange};

use crate::context::{ReplContext, ShellDashboard};

// ─────────────────────────────────────────────────────────────────────────────
// Datasets
// ─────────────────────────────────────────────────────────────────────────────

/// Read the activity dataset and the manifest off the async runtime, then
/// install both. Paths default to the configured ones.
pub async fn load(
    ctx: &ReplContext,
    weekly: Option<String>,
    manifest: Option<String>,
) -> Result<(), String> {
    let timer = Instant::now();
    let mut data_config = ctx.config.read().await.data.clone();
    if let Some(path) = weekly {
        data_config.weekly_activity = path;
        data_config.raw_activity = None;
    }
    let manifest_path = PathBuf::from(manifest.unwrap_or_else(|| data_config.manifest.clone()));
    let default_ds = ctx.config.read().await.tiles.default_dataset_date.clone();
    let today = offset::Local::now().date_naive();

    let (weekly, roster) = tokio::task::spawn_blocking(move || {
        (
            data::activity_or_fallback(&data_config, today),
            data::manifest_or_fallback(&manifest_path, &default_ds),
        )
    })
    .await
    .map_err(|e| format!("dataset load task failed: {e}"))?;

    let report = weekly.report;
    let weekly_origin = weekly.origin;
    let roster_origin = roster.origin;
    let chapters = roster.chapters.len();

    let mut dash = ctx.dashboard.lock().await;
    dash.load_weekly(weekly);
    dash.load_roster(roster);

    println!(
        "loaded {} weekly records ({} skipped, {} duplicates) and {} chapters in {}ms",
        report.loaded,
        report.skipped,
        report.duplicates,
        chapters,
        timer.elapsed().as_millis()
    );
    if weekly_origin == DataOrigin::Fallback || roster_origin == DataOrigin::Fallback {
        println!("warning: using fallback data (activity: {weekly_origin:?}, roster: {roster_origin:?})");
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Selection
// ─────────────────────────────────────────────────────────────────────────────

pub async fn set_range(ctx: &ReplContext, start: &str, end: &str) -> Result<(), String> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    let mut dash = ctx.dashboard.lock().await;
    dash.set_time_range(Some(TimeRange::from_dates(start, end)));
    print_selection(&dash);
    Ok(())
}

pub async fn clear_range(ctx: &ReplContext) {
    let mut dash = ctx.dashboard.lock().await;
    dash.set_time_range(None);
    print_selection(&dash);
}

pub async fn set_chapters(ctx: &ReplContext, ids: &[String]) {
    let mut dash = ctx.dashboard.lock().await;
    dash.set_chapter_ids_raw(ids);
    print_selection(&dash);
}

pub async fn toggle_chapter(ctx: &ReplContext, id: &str) -> Result<(), String> {
    let id = ChapterId::parse(id).map_err(|e| e.to_string())?;
    let mut dash = ctx.dashboard.lock().await;
    dash.toggle_chapter(id);
    println!("{}", toggle_line(&dash, id));
    print_selection(&dash);
    Ok(())
}

pub async fn search(ctx: &ReplContext, query: &str, select_all: bool) {
    let mut dash = ctx.dashboard.lock().await;
    dash.set_search_query(query);

    let results = dash.search().results(dash.roster());
    if results.is_empty() {
        println!("No chapters match \"{query}\"");
    }
    for chapter in &results {
        let marker = if dash.selection().chapter_ids.contains(chapter.chapter_id) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:>6}  {:<40} {}",
            chapter.chapter_id.value(),
            chapter.chapter,
            chapter.country.as_deref().unwrap_or("")
        );
    }

    if select_all {
        dash.select_all_matching();
        print_selection(&dash);
    }
}

pub async fn reset(ctx: &ReplContext) {
    let mut dash = ctx.dashboard.lock().await;
    dash.reset();
    print_selection(&dash);
}

pub async fn show_filter(ctx: &ReplContext) -> Result<(), String> {
    let dash = ctx.dashboard.lock().await;
    match dash.compiled_filter() {
        Some(filter) => {
            let text =
                serde_json::to_string_pretty(&filter.to_expression()).map_err(|e| e.to_string())?;
            println!("{text}");
        }
        None => println!("No filter (all features shown)"),
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Timeline
// ─────────────────────────────────────────────────────────────────────────────

pub async fn click(ctx: &ReplContext, x: f64) {
    let mut dash = ctx.dashboard.lock().await;
    dash.pointer_down(x);
    dash.pointer_up(x);
    print_selection(&dash);
}

pub async fn drag(ctx: &ReplContext, from: f64, to: f64) {
    let mut dash = ctx.dashboard.lock().await;
    dash.pointer_down(from);
    dash.pointer_move(to);
    dash.pointer_up(to);
    print_selection(&dash);
}

pub async fn key(ctx: &ReplContext, name: &str) -> Result<(), String> {
    let mut dash = ctx.dashboard.lock().await;
    if !dash.key_name(name) {
        let known = BrushKey::key_names().collect::<Vec<_>>().join(", ");
        return Err(format!("error: unhandled key {name} (expected one of {known})\n"));
    }
    print_selection(&dash);
    Ok(())
}

/// Resize the timeline like a window host would: queue the size, wait out the
/// debounce window, then apply whatever size is still queued.
pub async fn resize(ctx: &ReplContext, width: f64, height: f64) {
    let delay = {
        let mut dash = ctx.dashboard.lock().await;
        dash.request_resize(width, height, Instant::now());
        Duration::from_millis(dash.config().timeline.resize_debounce_ms)
    };
    tokio::time::sleep(delay).await;

    let mut dash = ctx.dashboard.lock().await;
    if !dash.poll_resize(Instant::now()) {
        tracing::debug!(width, height, "Resize superseded by a later request");
    }
    let (w, h) = dash.timeline().size();
    println!("timeline size {w}x{h}");
}

pub async fn show_frame(ctx: &ReplContext) -> Result<(), String> {
    let dash = ctx.dashboard.lock().await;
    let frame = dash.timeline().render();
    if frame.is_empty() {
        println!("Nothing to draw");
        return Ok(());
    }
    let text = serde_json::to_string_pretty(&frame).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

pub async fn show_buckets(ctx: &ReplContext) {
    let mut dash = ctx.dashboard.lock().await;
    let buckets = dash.buckets();
    if buckets.is_empty() {
        println!("No activity for the current selection");
        return;
    }

    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>8} {:>10}",
        "Week", "All", "Buildings", "Highways", "Amenities", "Other", "Mappers", "Rolling"
    );
    println!("{}", "-".repeat(88));
    for b in buckets {
        println!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>8} {:>10.1}",
            b.bucket_start.to_string(),
            b.all_feats,
            b.buildings,
            b.highways,
            b.amenities,
            b.other,
            b.mappers,
            b.rolling_value
        );
    }
    println!("\nTotal: {} weeks", buckets.len());
}

pub async fn show_stats(ctx: &ReplContext) {
    let mut dash = ctx.dashboard.lock().await;
    let heading = selection_line(&dash);
    let Some(summary) = dash.summary() else {
        println!("No activity for {heading}");
        return;
    };

    println!("{heading}");
    println!("  total features:   {}", summary.totals.all_feats);
    println!("  active weeks:     {}", summary.active_weeks);
    println!("  avg weekly:       {}", summary.avg_weekly_activity);
    println!("  peak mappers:     {}", summary.peak_mappers);
    for share in &summary.distribution {
        println!(
            "  {:<16}  {:>8}  {:>5.1}%",
            share.name,
            share.value,
            share.share * 100.0
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Map
// ─────────────────────────────────────────────────────────────────────────────

pub async fn show_layers(ctx: &ReplContext, zoom: Option<f64>) {
    let mut dash = ctx.dashboard.lock().await;
    if let Some(zoom) = zoom {
        dash.map_mut().set_zoom(zoom);
    }

    let map = dash.map();
    println!(
        "style {} | projection {} | zoom {:.2} | ds={}",
        map.style(),
        map.projection(),
        map.zoom(),
        dash.layers().dataset_date()
    );
    let visible = dash.visible_layers();
    for id in dash.layers().layer_ids() {
        let state = match (map.has_layer(id), visible.contains(&id)) {
            (false, _) => "missing",
            (true, true) => "visible",
            (true, false) => "hidden",
        };
        let filter = map
            .filter(id)
            .map(|f| f.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{id:<14} {state:<8} {filter}");
    }
}

pub async fn click_control(ctx: &ReplContext, name: &str) -> Result<(), String> {
    let now = Instant::now();
    let mut dash = ctx.dashboard.lock().await;
    let outcome = dash
        .click_control(name, now)
        .ok_or_else(|| format!("error: unknown control {name}\n"))?;
    println!("{name}: {outcome:?}");
    for (control, button) in dash.control_buttons(now) {
        println!("  {control:<6} {} {}", button.label, button.title);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

pub async fn show_config(ctx: &ReplContext, save: bool) -> Result<(), String> {
    let config = ctx.config.read().await;
    if save {
        config.save().map_err(|e| format!("error: {e}\n"))?;
        println!("Configuration saved");
    }
    match ymdash_core::DashboardConfig::config_path() {
        Ok(path) => println!("config file: {}", path.display()),
        Err(e) => tracing::warn!(error = %e, "Could not resolve config path"),
    }
    let text = serde_json::to_string_pretty(&*config).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

pub fn exit() -> Result<(), String> {
    write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|e| format!("error: invalid date {input}: {e}\n"))
}

/// Names shown after the chapter label before the list is elided.
const NAMED_CHAPTERS: usize = 3;

fn print_selection(dash: &ShellDashboard) {
    println!("{}", selection_line(dash));
}

pub(crate) fn selection_line(dash: &ShellDashboard) -> String {
    let range = dash
        .selection()
        .time_range
        .map(|r| r.to_string())
        .unwrap_or_else(|| "all time".to_string());
    let names: Vec<&str> = dash
        .roster()
        .resolve(&dash.selection().chapter_ids)
        .map(|c| c.chapter.as_str())
        .collect();

    let label = dash.chapter_label();
    match names.len() {
        0 => format!("{range} | {label}"),
        n if n <= NAMED_CHAPTERS => format!("{range} | {label} ({})", names.join(", ")),
        _ => format!(
            "{range} | {label} ({}, ...)",
            names[..NAMED_CHAPTERS].join(", ")
        ),
    }
}

pub(crate) fn toggle_line(dash: &ShellDashboard, id: ChapterId) -> String {
    let name = dash.roster().name(id).unwrap_or("unknown chapter");
    let state = if dash.selection().chapter_ids.contains(id) {
        "selected"
    } else {
        "deselected"
    };
    format!("{name} ({id}) {state}")
}
