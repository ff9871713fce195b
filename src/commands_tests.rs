//! Tests for the shell commands

use std::time::Instant;

use ymdash_core::data::parse_manifest;
use ymdash_core::{ChapterId, ChapterSet, DashboardConfig};

use crate::commands::{self, selection_line, toggle_line};
use crate::context::ReplContext;

const MANIFEST: &str = r#"{
  "ds": "2025-09-01",
  "chapters": [
    {"chapter_id": 1, "chapter": "GMU Mappers", "country": "United States"},
    {"chapter_id": 2, "chapter": "KNUST YouthMappers", "country": "Ghana"},
    {"chapter_id": 3, "chapter": "Makerere YouthMappers", "country": "Uganda"},
    {"chapter_id": 4, "chapter": "UP Diliman Mappers", "country": "Philippines"}
  ]
}"#;

fn context() -> ReplContext {
    let mut config = DashboardConfig::default();
    config.timeline.resize_debounce_ms = 10;
    ReplContext::with_config(config)
}

async fn with_roster() -> ReplContext {
    let ctx = context();
    let manifest = parse_manifest(MANIFEST, "2025-08-04").expect("manifest");
    ctx.dashboard.lock().await.load_roster(manifest);
    ctx
}

fn chapters(ids: &[i64]) -> ChapterSet {
    ids.iter().copied().collect()
}

#[tokio::test]
async fn test_resize_applies_after_debounce() {
    let ctx = context();
    commands::resize(&ctx, 640.0, 90.0).await;
    assert_eq!(ctx.dashboard.lock().await.timeline().size(), (640.0, 90.0));
}

#[tokio::test]
async fn test_resize_keeps_only_latest_request() {
    let ctx = context();
    ctx.dashboard
        .lock()
        .await
        .request_resize(300.0, 90.0, Instant::now());

    commands::resize(&ctx, 700.0, 90.0).await;
    let mut dash = ctx.dashboard.lock().await;
    assert_eq!(dash.timeline().size(), (700.0, 90.0));
    assert!(!dash.poll_resize(Instant::now()), "nothing left queued");
}

#[tokio::test]
async fn test_selection_line_names_selected_chapters() {
    let ctx = with_roster().await;
    let mut dash = ctx.dashboard.lock().await;
    assert_eq!(selection_line(&dash), "all time | All Chapters");

    dash.set_chapter_ids(chapters(&[2, 1]));
    assert_eq!(
        selection_line(&dash),
        "all time | 2 Chapters (GMU Mappers, KNUST YouthMappers)"
    );

    dash.set_chapter_ids(chapters(&[1, 2, 3, 4]));
    assert!(
        selection_line(&dash).ends_with("(GMU Mappers, KNUST YouthMappers, Makerere YouthMappers, ...)"),
        "long selections are elided"
    );
}

#[tokio::test]
async fn test_selection_line_skips_unknown_chapters() {
    let ctx = with_roster().await;
    let mut dash = ctx.dashboard.lock().await;
    dash.set_chapter_ids(chapters(&[999]));
    assert_eq!(selection_line(&dash), "all time | 1 Chapter");
}

#[tokio::test]
async fn test_toggle_line_uses_roster_name() {
    let ctx = with_roster().await;
    let mut dash = ctx.dashboard.lock().await;

    dash.toggle_chapter(ChapterId(2));
    assert_eq!(toggle_line(&dash, ChapterId(2)), "KNUST YouthMappers (2) selected");
    dash.toggle_chapter(ChapterId(2));
    assert_eq!(toggle_line(&dash, ChapterId(2)), "KNUST YouthMappers (2) deselected");

    dash.toggle_chapter(ChapterId(77));
    assert_eq!(toggle_line(&dash, ChapterId(77)), "unknown chapter (77) selected");
}
