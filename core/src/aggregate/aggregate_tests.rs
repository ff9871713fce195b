//! Tests for temporal aggregation, rolling averages and summaries

use chrono::NaiveDate;
use proptest::prelude::*;
use ymdash_types::{ActivityRecord, ChapterId};

use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn row(week: NaiveDate, chapter: i64, all_feats: i64) -> WeeklyChapterRecord {
    WeeklyChapterRecord {
        week,
        chapter_id: ChapterId(chapter),
        counts: FeatureCounts::derived(all_feats, all_feats / 2, 0, 0),
        mappers: 1,
    }
}

fn scenario_records() -> Vec<WeeklyChapterRecord> {
    vec![
        row(date(2023, 1, 2), 1, 10),
        row(date(2023, 1, 9), 1, 20),
        row(date(2023, 1, 2), 2, 5),
    ]
}

#[test]
fn test_aggregate_single_chapter_scenario() {
    let filter: ChapterSet = [1i64].into_iter().collect();
    let buckets = aggregate(&scenario_records(), &filter, DEFAULT_ROLLING_WINDOW);

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].bucket_start, date(2023, 1, 2));
    assert_eq!(buckets[0].all_feats, 10);
    assert_eq!(buckets[1].bucket_start, date(2023, 1, 9));
    assert_eq!(buckets[1].all_feats, 20);
}

#[test]
fn test_aggregate_empty_filter_means_all_chapters() {
    let buckets = aggregate(&scenario_records(), &ChapterSet::new(), DEFAULT_ROLLING_WINDOW);

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].all_feats, 15);
    assert_eq!(buckets[0].chapter_count, 2);
    assert_eq!(buckets[0].mappers, 2);
    assert_eq!(buckets[1].all_feats, 20);
    assert_eq!(buckets[1].chapter_count, 1);
}

#[test]
fn test_aggregate_empty_input() {
    let buckets = aggregate(&[], &ChapterSet::new(), DEFAULT_ROLLING_WINDOW);
    assert!(buckets.is_empty());
}

#[test]
fn test_aggregate_unknown_chapter_matches_nothing() {
    let filter: ChapterSet = [404i64].into_iter().collect();
    let buckets = aggregate(&scenario_records(), &filter, DEFAULT_ROLLING_WINDOW);
    assert!(buckets.is_empty(), "unknown chapter should select no rows");
}

#[test]
fn test_aggregate_handles_irregular_spacing() {
    let records = vec![
        row(date(2023, 3, 1), 1, 4),
        row(date(2023, 1, 1), 1, 2),
        row(date(2023, 1, 3), 1, 6),
    ];
    let buckets = aggregate(&records, &ChapterSet::new(), DEFAULT_ROLLING_WINDOW);
    let starts: Vec<_> = buckets.iter().map(|b| b.bucket_start).collect();
    assert_eq!(
        starts,
        vec![date(2023, 1, 1), date(2023, 1, 3), date(2023, 3, 1)],
        "buckets must be strictly increasing"
    );
}

#[test]
fn test_rolling_mean_shrinks_at_start() {
    let rolling = rolling_mean(&[4, 8, 12, 16, 20], 4);
    assert_eq!(rolling, vec![4.0, 6.0, 8.0, 10.0, 14.0]);
}

#[test]
fn test_rolling_mean_zero_window_treated_as_one() {
    assert_eq!(rolling_mean(&[3, 5], 0), vec![3.0, 5.0]);
}

#[test]
fn test_rolling_mean_near_i64_bounds() {
    let rolling = rolling_mean(&[i64::MAX, i64::MAX, i64::MIN], 2);
    assert_eq!(rolling, vec![i64::MAX as f64, i64::MAX as f64, -0.5]);
}

#[test]
fn test_huge_counts_saturate() {
    let mut first = row(date(2023, 1, 2), 1, i64::MAX);
    first.mappers = i64::MAX;
    let records = vec![
        first,
        row(date(2023, 1, 2), 2, i64::MAX),
        row(date(2023, 1, 9), 1, i64::MAX),
    ];
    let buckets = aggregate(&records, &ChapterSet::new(), DEFAULT_ROLLING_WINDOW);

    assert_eq!(buckets[0].all_feats, i64::MAX, "two chapters clamp at the bound");
    assert_eq!(buckets[0].buildings, i64::MAX - 1, "(MAX/2) * 2");
    assert_eq!(buckets[0].mappers, i64::MAX);
    assert_eq!(buckets[1].rolling_value, i64::MAX as f64);

    let summary = summarize(&buckets).expect("non-empty buckets");
    assert_eq!(summary.totals.all_feats, i64::MAX);
    let share_sum: f64 = summary.distribution.iter().map(|c| c.share).sum();
    assert!(share_sum.is_finite());
}

#[test]
fn test_aggregator_recomputes_only_on_filter_change() {
    let mut aggregator = TemporalAggregator::new(scenario_records(), DEFAULT_ROLLING_WINDOW);
    assert!(aggregator.is_dirty());
    let first = aggregator.buckets().to_vec();
    assert!(!aggregator.is_dirty());

    assert!(!aggregator.set_chapter_filter(ChapterSet::new()), "same filter is a no-op");
    assert_eq!(aggregator.buckets(), first.as_slice());

    let filter: ChapterSet = [2i64].into_iter().collect();
    assert!(aggregator.set_chapter_filter(filter));
    assert!(aggregator.is_dirty());
    assert_eq!(aggregator.buckets().len(), 1);
    assert_eq!(aggregator.buckets()[0].all_feats, 5);
}

#[test]
fn test_week_start_is_monday() {
    assert_eq!(week_start(date(2023, 1, 4)), date(2023, 1, 2));
    assert_eq!(week_start(date(2023, 1, 2)), date(2023, 1, 2));
    assert_eq!(week_start(date(2023, 1, 8)), date(2023, 1, 2));
}

#[test]
fn test_bucket_activity_groups_by_week_and_chapter() {
    let monday = 1_672_617_600; // 2023-01-02T00:00:00Z
    let event = |timestamp: i64, chapter: i64, all_feats: i64| ActivityRecord {
        timestamp,
        chapter_id: ChapterId(chapter),
        counts: FeatureCounts::derived(all_feats, 1, 0, 0),
    };
    let rows = bucket_activity(&[
        event(monday + 3600, 1, 5),
        event(monday + 2 * 86_400, 1, 7),
        event(monday + 7 * 86_400, 1, 1),
        event(monday, 2, 3),
    ]);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].week, date(2023, 1, 2));
    assert_eq!(rows[0].chapter_id, ChapterId(1));
    assert_eq!(rows[0].counts.all_feats, 12);
    assert_eq!(rows[0].counts.buildings, 2);
    assert_eq!(rows[1].chapter_id, ChapterId(2));
    assert_eq!(rows[2].week, date(2023, 1, 9));
}

#[test]
fn test_summarize_scenario() {
    let mut records = scenario_records();
    records.push(row(date(2023, 1, 16), 1, 0));
    let buckets = aggregate(&records, &ChapterSet::new(), DEFAULT_ROLLING_WINDOW);
    let summary = summarize(&buckets).expect("non-empty buckets");

    assert_eq!(summary.totals.all_feats, 35);
    assert_eq!(summary.active_weeks, 2);
    assert_eq!(summary.avg_weekly_activity, 18, "35 / 2 rounds to 18");
    assert_eq!(summary.peak_mappers, 2);
    assert!(summary.distribution.iter().all(|c| c.value > 0));
    let share_sum: f64 = summary.distribution.iter().map(|c| c.share).sum();
    assert!((share_sum - 1.0).abs() < 1e-9);
}

#[test]
fn test_summarize_empty() {
    assert!(summarize(&[]).is_none());
}

fn arb_records() -> impl Strategy<Value = Vec<WeeklyChapterRecord>> {
    prop::collection::vec((0u32..20, 1i64..6, 0i64..500, 0i64..10), 0..60).prop_map(|rows| {
        let mut seen = std::collections::HashSet::new();
        rows.into_iter()
            .filter(|(week, chapter, _, _)| seen.insert((*week, *chapter)))
            .map(|(week, chapter, all_feats, mappers)| WeeklyChapterRecord {
                week: date(2023, 1, 2) + chrono::Days::new(u64::from(week) * 7),
                chapter_id: ChapterId(chapter),
                counts: FeatureCounts::derived(all_feats, all_feats / 3, all_feats / 5, 0),
                mappers,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_totals_are_conserved(
        records in arb_records(),
        chapters in prop::collection::btree_set(1i64..6, 0..4),
    ) {
        let filter: ChapterSet = chapters.into_iter().collect();
        let buckets = aggregate(&records, &filter, DEFAULT_ROLLING_WINDOW);

        let expected: FeatureCounts = records
            .iter()
            .filter(|r| filter.admits(r.chapter_id))
            .fold(FeatureCounts::default(), |mut acc, r| { acc.add(&r.counts); acc });
        let mut actual = FeatureCounts::default();
        let mut mappers = 0;
        for bucket in &buckets {
            actual.add(&bucket.counts());
            mappers += bucket.mappers;
        }
        let expected_mappers: i64 = records
            .iter()
            .filter(|r| filter.admits(r.chapter_id))
            .map(|r| r.mappers)
            .sum();

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(mappers, expected_mappers);
    }

    #[test]
    fn prop_rolling_value_has_no_look_ahead(
        values in prop::collection::vec(0i64..1000, 1..40),
        tail in prop::collection::vec(0i64..1000, 0..10),
        window in 1usize..8,
    ) {
        let prefix = rolling_mean(&values, window);
        let mut extended = values.clone();
        extended.extend(tail);
        let full = rolling_mean(&extended, window);
        prop_assert_eq!(&full[..values.len()], prefix.as_slice());
    }

    #[test]
    fn prop_aggregate_is_idempotent(records in arb_records()) {
        let filter = ChapterSet::new();
        prop_assert_eq!(
            aggregate(&records, &filter, 4),
            aggregate(&records, &filter, 4)
        );
    }
}
