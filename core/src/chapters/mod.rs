//! Chapter roster and the chapter selector's search logic.

mod roster;
mod search;

pub use roster::ChapterRoster;
pub use search::ChapterSearch;

#[cfg(test)]
mod tests {
    use ymdash_types::{Chapter, ChapterId, ChapterSet};

    use super::*;

    fn chapter(id: i64, name: &str, country: &str, university: Option<&str>) -> Chapter {
        Chapter {
            chapter_id: ChapterId(id),
            chapter: name.to_string(),
            university: university.map(str::to_string),
            city: None,
            country: Some(country.to_string()),
        }
    }

    fn roster() -> ChapterRoster {
        ChapterRoster::new([
            chapter(3, "YouthMappers UG", "Uganda", Some("Makerere University")),
            chapter(1, "GMU Mappers", "United States", Some("George Mason University")),
            chapter(7, "KNUST YouthMappers", "Ghana", None),
            chapter(1, "Duplicate", "Nowhere", None),
        ])
    }

    #[test]
    fn test_roster_sorted_and_deduplicated() {
        let roster = roster();
        let names: Vec<&str> = roster.iter().map(|c| c.chapter.as_str()).collect();
        assert_eq!(names, ["GMU Mappers", "KNUST YouthMappers", "YouthMappers UG"]);
        assert_eq!(roster.name(ChapterId(1)), Some("GMU Mappers"), "first record wins");
        assert_eq!(roster.get(ChapterId(99)), None);
    }

    #[test]
    fn test_resolve_skips_unknown_ids() {
        let roster = roster();
        let selection: ChapterSet = [7i64, 99].into_iter().collect();
        let names: Vec<&str> = roster.resolve(&selection).map(|c| c.chapter.as_str()).collect();
        assert_eq!(names, ["KNUST YouthMappers"]);
    }

    #[test]
    fn test_search_matches_name_country_university() {
        let roster = roster();
        let mut search = ChapterSearch::new();
        assert_eq!(search.results(&roster).len(), 3, "empty query matches all");

        search.set_query("youthmappers");
        assert_eq!(search.results(&roster).len(), 2);

        search.set_query("GHANA");
        let hits = search.results(&roster);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chapter_id, ChapterId(7));

        search.set_query("mason");
        assert_eq!(search.results(&roster)[0].chapter_id, ChapterId(1));

        search.set_query("atlantis");
        assert!(search.results(&roster).is_empty());

        search.clear_query();
        assert_eq!(search.query(), "");
    }

    #[test]
    fn test_selection_operations_return_new_sets() {
        let roster = roster();
        let mut search = ChapterSearch::new();
        let empty = ChapterSet::new();

        let one = search.toggle(&empty, ChapterId(3));
        assert!(empty.is_empty(), "input untouched");
        assert_eq!(one.ids(), [3]);
        assert!(search.toggle(&one, ChapterId(3)).is_empty());

        search.set_query("youthmappers");
        assert_eq!(search.select_all(&roster).ids(), [3, 7]);
        assert!(search.clear_all().is_empty());
    }

    #[test]
    fn test_label() {
        let mut selection = ChapterSet::new();
        assert_eq!(ChapterSearch::label(&selection), "All Chapters");
        selection.insert(ChapterId(1));
        assert_eq!(ChapterSearch::label(&selection), "1 Chapter");
        selection.insert(ChapterId(2));
        assert_eq!(ChapterSearch::label(&selection), "2 Chapters");
    }
}
