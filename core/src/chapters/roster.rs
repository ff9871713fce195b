use hashbrown::HashMap;
use ymdash_types::{Chapter, ChapterId, ChapterSet};

/// Selectable chapters, sorted by display name, with ID lookup.
#[derive(Debug, Clone, Default)]
pub struct ChapterRoster {
    chapters: Vec<Chapter>,
    by_id: HashMap<ChapterId, usize>,
}

impl ChapterRoster {
    /// Build from chapter records. Duplicate IDs keep the first record.
    pub fn new(chapters: impl IntoIterator<Item = Chapter>) -> Self {
        let mut seen = ChapterSet::new();
        let mut chapters: Vec<Chapter> = chapters
            .into_iter()
            .filter(|c| {
                let fresh = seen.insert(c.chapter_id);
                if !fresh {
                    tracing::warn!(chapter_id = %c.chapter_id, "Duplicate chapter in roster");
                }
                fresh
            })
            .collect();
        chapters.sort_by_cached_key(|c| c.chapter.to_lowercase());

        let by_id = chapters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.chapter_id, i))
            .collect();
        Self { chapters, by_id }
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn get(&self, id: ChapterId) -> Option<&Chapter> {
        self.by_id.get(&id).map(|&i| &self.chapters[i])
    }

    pub fn name(&self, id: ChapterId) -> Option<&str> {
        self.get(id).map(|c| c.chapter.as_str())
    }

    /// Chapters in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.iter()
    }

    pub fn ids(&self) -> ChapterSet {
        self.chapters.iter().map(|c| c.chapter_id).collect()
    }

    /// Selected chapters that exist in the roster, in name order.
    pub fn resolve<'a>(&'a self, selection: &'a ChapterSet) -> impl Iterator<Item = &'a Chapter> + 'a {
        self.chapters
            .iter()
            .filter(move |c| selection.contains(c.chapter_id))
    }
}
