use crate::models::{CatalogItem, MediaKind, WatchlistEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Only(MediaKind),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LibrarySort {
    /// Watchlist order.
    #[default]
    Added,
    /// A-Z, ignoring case and accents.
    Title,
    /// Newest release first, undated last.
    Year,
}

/// A watchlist entry joined with its catalog record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryEntry {
    pub kind: MediaKind,
    pub id: u64,
    pub added_index: usize,
    pub added_at: DateTime<Utc>,
    pub item: CatalogItem,
}

/// Joins entries with fetched records. Entries whose record did not load
/// are left out.
pub fn build_library(entries: &[WatchlistEntry], items: &[CatalogItem]) -> Vec<LibraryEntry> {
    let by_key: HashMap<(MediaKind, u64), &CatalogItem> =
        items.iter().map(|i| ((i.kind, i.id), i)).collect();

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            by_key
                .get(&(entry.kind, entry.ref_id))
                .map(|item| LibraryEntry {
                    kind: entry.kind,
                    id: entry.ref_id,
                    added_index: index,
                    added_at: entry.created_at,
                    item: (*item).clone(),
                })
        })
        .collect()
}

pub fn arrange(library: &[LibraryEntry], filter: KindFilter, sort: LibrarySort) -> Vec<LibraryEntry> {
    let mut list: Vec<LibraryEntry> = library
        .iter()
        .filter(|e| match filter {
            KindFilter::All => true,
            KindFilter::Only(kind) => e.kind == kind,
        })
        .cloned()
        .collect();

    match sort {
        LibrarySort::Added => list.sort_by_key(|e| e.added_index),
        LibrarySort::Title => list.sort_by_cached_key(|e| title_key(e.item.display_title())),
        LibrarySort::Year => list.sort_by(|a, b| {
            b.item
                .year()
                .unwrap_or(0)
                .cmp(&a.item.year().unwrap_or(0))
        }),
    }

    list
}

/// Lowercased with diacritics stripped, so "Ámbar" sorts next to "ambar".
fn title_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(kind: MediaKind, ref_id: u64) -> WatchlistEntry {
        WatchlistEntry {
            id: format!("{}-{}", kind, ref_id),
            user_id: "u1".into(),
            kind,
            ref_id,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn library() -> Vec<LibraryEntry> {
        let entries = vec![
            entry(MediaKind::Movie, 1),
            entry(MediaKind::Show, 1),
            entry(MediaKind::Movie, 2),
            entry(MediaKind::Movie, 3),
        ];
        let items = vec![
            CatalogItem::new(MediaKind::Movie, 1)
                .with_title("zodiac")
                .with_release_date("2007-03-02"),
            CatalogItem::new(MediaKind::Show, 1)
                .with_title("Andor")
                .with_release_date("2022-09-21"),
            CatalogItem::new(MediaKind::Movie, 2).with_title("Memento"),
        ];
        build_library(&entries, &items)
    }

    fn ids(list: &[LibraryEntry]) -> Vec<(MediaKind, u64)> {
        list.iter().map(|e| (e.kind, e.id)).collect()
    }

    #[test]
    fn unresolved_entries_are_skipped() {
        let lib = library();
        assert_eq!(lib.len(), 3);
        assert_eq!(lib[2].added_index, 2);
    }

    #[test]
    fn sorts() {
        let lib = library();

        assert_eq!(
            ids(&arrange(&lib, KindFilter::All, LibrarySort::Title)),
            vec![(MediaKind::Show, 1), (MediaKind::Movie, 2), (MediaKind::Movie, 1)]
        );
        assert_eq!(
            ids(&arrange(&lib, KindFilter::All, LibrarySort::Year)),
            vec![(MediaKind::Show, 1), (MediaKind::Movie, 1), (MediaKind::Movie, 2)]
        );
        assert_eq!(
            ids(&arrange(&lib, KindFilter::All, LibrarySort::Added)),
            vec![(MediaKind::Movie, 1), (MediaKind::Show, 1), (MediaKind::Movie, 2)]
        );
    }

    #[test]
    fn title_sort_ignores_accents() {
        let entries: Vec<WatchlistEntry> = (1..=3).map(|id| entry(MediaKind::Movie, id)).collect();
        let items = vec![
            CatalogItem::new(MediaKind::Movie, 1).with_title("Zodiac"),
            CatalogItem::new(MediaKind::Movie, 2).with_title("Ámbar"),
            CatalogItem::new(MediaKind::Movie, 3).with_title("Élite"),
        ];
        let lib = build_library(&entries, &items);

        let sorted = arrange(&lib, KindFilter::All, LibrarySort::Title);
        assert_eq!(
            ids(&sorted),
            vec![(MediaKind::Movie, 2), (MediaKind::Movie, 3), (MediaKind::Movie, 1)]
        );
        assert_eq!(title_key("Ámbar"), "ambar");
    }

    #[test]
    fn filters_by_kind() {
        let lib = library();
        let shows = arrange(&lib, KindFilter::Only(MediaKind::Show), LibrarySort::Added);
        assert_eq!(ids(&shows), vec![(MediaKind::Show, 1)]);
    }
}
