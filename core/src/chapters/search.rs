use ymdash_types::{Chapter, ChapterId, ChapterSet};

use super::roster::ChapterRoster;

/// Search box state for the chapter selector.
///
/// Never mutates the selection: every operation returns the new set for the
/// dashboard to commit.
#[derive(Debug, Clone, Default)]
pub struct ChapterSearch {
    query: String,
    needle: String,
}

impl ChapterSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.needle = self.query.trim().to_lowercase();
    }

    pub fn clear_query(&mut self) {
        self.set_query(String::new());
    }

    /// Case-insensitive substring match on name, country or university.
    pub fn matches(&self, chapter: &Chapter) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        let hit = |field: &str| field.to_lowercase().contains(&self.needle);
        hit(&chapter.chapter)
            || chapter.country.as_deref().is_some_and(hit)
            || chapter.university.as_deref().is_some_and(hit)
    }

    /// Matching chapters in name order.
    pub fn results<'a>(&self, roster: &'a ChapterRoster) -> Vec<&'a Chapter> {
        roster.iter().filter(|c| self.matches(c)).collect()
    }

    pub fn toggle(&self, selection: &ChapterSet, id: ChapterId) -> ChapterSet {
        selection.toggled(id)
    }

    /// Replace the selection with every chapter matching the current query.
    pub fn select_all(&self, roster: &ChapterRoster) -> ChapterSet {
        self.results(roster).iter().map(|c| c.chapter_id).collect()
    }

    pub fn clear_all(&self) -> ChapterSet {
        ChapterSet::new()
    }

    /// Summary label for the selector button.
    pub fn label(selection: &ChapterSet) -> String {
        match selection.len() {
            0 => "All Chapters".to_string(),
            1 => "1 Chapter".to_string(),
            n => format!("{n} Chapters"),
        }
    }
}
