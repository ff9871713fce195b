//! Filter compilation
//!
//! Translates the dashboard selection into a boolean predicate tree shaped like
//! the map style expression language, so the same value can be evaluated
//! locally and handed to the map renderer unchanged.


use serde_json::{Value, json};
use ymdash_types::{ActivityRecord, ChapterId, ChapterSet, TimeRange};

/// Feature property holding the event time in epoch seconds.
pub const TIMESTAMP_PROPERTY: &str = "timestamp";
/// Feature property holding the chapter ID.
pub const CHAPTER_PROPERTY: &str = "chapter_id";

/// Leaf predicate over a feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// `timestamp >= t`
    TimestampAtLeast(i64),
    /// `timestamp <= t`
    TimestampAtMost(i64),
    /// `chapter_id ∈ set`
    ChapterIn(ChapterSet),
}

/// Boolean expression tree over [`Predicate`] leaves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompiledFilter {
    All(Vec<CompiledFilter>),
    Any(Vec<CompiledFilter>),
    None(Vec<CompiledFilter>),
    Leaf(Predicate),
}

impl Predicate {
    pub fn matches(&self, record: &ActivityRecord) -> bool {
        match self {
            Predicate::TimestampAtLeast(t) => record.timestamp >= *t,
            Predicate::TimestampAtMost(t) => record.timestamp <= *t,
            Predicate::ChapterIn(set) => set.contains(record.chapter_id),
        }
    }

    fn to_expression(&self) -> Value {
        match self {
            Predicate::TimestampAtLeast(t) => json!([">=", ["get", TIMESTAMP_PROPERTY], t]),
            Predicate::TimestampAtMost(t) => json!(["<=", ["get", TIMESTAMP_PROPERTY], t]),
            Predicate::ChapterIn(set) => {
                json!(["in", ["get", CHAPTER_PROPERTY], ["literal", set.ids()]])
            }
        }
    }
}

impl CompiledFilter {
    /// Evaluate with the map library's semantics: an empty `all` or `none` is
    /// true and an empty `any` is false.
    pub fn matches(&self, record: &ActivityRecord) -> bool {
        match self {
            CompiledFilter::All(children) => children.iter().all(|c| c.matches(record)),
            CompiledFilter::Any(children) => children.iter().any(|c| c.matches(record)),
            CompiledFilter::None(children) => !children.iter().any(|c| c.matches(record)),
            CompiledFilter::Leaf(predicate) => predicate.matches(record),
        }
    }

    /// Render as a style filter expression.
    pub fn to_expression(&self) -> Value {
        let combine = |op: &str, children: &[CompiledFilter]| {
            let mut items = vec![Value::from(op)];
            items.extend(children.iter().map(CompiledFilter::to_expression));
            Value::Array(items)
        };
        match self {
            CompiledFilter::All(children) => combine("all", children),
            CompiledFilter::Any(children) => combine("any", children),
            CompiledFilter::None(children) => combine("none", children),
            CompiledFilter::Leaf(predicate) => predicate.to_expression(),
        }
    }
}

/// Compile a selection into a filter.
///
/// Returns `None` when neither a time range nor any chapter is selected; callers
/// must treat that as "clear all filters", never as "match nothing".
pub fn compile(time_range: Option<TimeRange>, chapter_ids: &ChapterSet) -> Option<CompiledFilter> {
    let mut clauses = Vec::with_capacity(3);

    if let Some(range) = time_range {
        clauses.push(CompiledFilter::Leaf(Predicate::TimestampAtLeast(range.start)));
        clauses.push(CompiledFilter::Leaf(Predicate::TimestampAtMost(range.end)));
    }

    let chapter_clause = (!chapter_ids.is_empty())
        .then(|| CompiledFilter::Leaf(Predicate::ChapterIn(chapter_ids.clone())));

    match (clauses.is_empty(), chapter_clause) {
        (true, None) => None,
        (true, Some(chapters)) => Some(chapters),
        (false, chapters) => {
            clauses.extend(chapters);
            Some(CompiledFilter::All(clauses))
        }
    }
}

/// Compile from textual chapter IDs as they arrive from form inputs.
///
/// Each ID is canonicalized with [`ChapterId::parse`]; entries that are not
/// integers are logged and skipped, so `"7"` and `7` always select the same
/// features.
pub fn compile_raw<S: AsRef<str>>(
    time_range: Option<TimeRange>,
    chapter_ids: &[S],
) -> Option<CompiledFilter> {
    compile(time_range, &canonicalize_ids(chapter_ids))
}

/// Parse textual chapter IDs into a [`ChapterSet`], dropping invalid entries.
pub fn canonicalize_ids<S: AsRef<str>>(chapter_ids: &[S]) -> ChapterSet {
    chapter_ids
        .iter()
        .filter_map(|raw| match ChapterId::parse(raw.as_ref()) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(input = raw.as_ref(), error = %e, "Ignoring invalid chapter id");
                None
            }
        })
        .collect()
}
