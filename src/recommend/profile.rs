use crate::models::CatalogItem;

/// Number of favorite genres kept in a profile.
pub const FAVORITE_GENRES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenreCount {
    pub genre_id: u32,
    pub count: usize,
}

/// Counts per genre across `items`, in the order genres were first seen.
/// An item adds at most one to each of its genres.
pub fn genre_counts<'a>(items: impl IntoIterator<Item = &'a CatalogItem>) -> Vec<GenreCount> {
    let mut counts: Vec<GenreCount> = Vec::new();

    for item in items {
        for (i, &genre_id) in item.genre_ids.iter().enumerate() {
            if item.genre_ids[..i].contains(&genre_id) {
                continue;
            }
            match counts.iter_mut().find(|c| c.genre_id == genre_id) {
                Some(entry) => entry.count += 1,
                None => counts.push(GenreCount { genre_id, count: 1 }),
            }
        }
    }

    counts
}

/// A user's favorite genres, most frequent first.
///
/// An empty profile means there is nothing to personalize on; consumers
/// fall back to unfiltered results instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffinityProfile {
    ranked: Vec<GenreCount>,
}

impl AffinityProfile {
    /// Profile with the default number of favorite genres.
    pub fn build<'a>(items: impl IntoIterator<Item = &'a CatalogItem>) -> Self {
        Self::build_top(items, FAVORITE_GENRES)
    }

    pub fn build_top<'a>(items: impl IntoIterator<Item = &'a CatalogItem>, top_n: usize) -> Self {
        let mut ranked = genre_counts(items);
        // stable: ties keep first-seen order
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(top_n);
        Self { ranked }
    }

    /// Profile made of the given genres, each counted once.
    pub fn from_genres(genre_ids: &[u32]) -> Self {
        let mut ranked: Vec<GenreCount> = Vec::with_capacity(genre_ids.len());
        for &genre_id in genre_ids {
            if !ranked.iter().any(|c| c.genre_id == genre_id) {
                ranked.push(GenreCount { genre_id, count: 1 });
            }
        }
        Self { ranked }
    }

    pub fn entries(&self) -> &[GenreCount] {
        &self.ranked
    }

    pub fn genre_ids(&self) -> Vec<u32> {
        self.ranked.iter().map(|c| c.genre_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// True when `item` shares at least one genre with the profile.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.ranked
            .iter()
            .any(|c| item.genre_ids.contains(&c.genre_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    fn movie(id: u64, genres: &[u32]) -> CatalogItem {
        CatalogItem::new(MediaKind::Movie, id).with_genres(genres)
    }

    #[test]
    fn ranks_by_count_and_keeps_top_three() {
        let items = vec![
            movie(1, &[18, 28]),
            movie(2, &[28, 35]),
            movie(3, &[28, 18, 99]),
            movie(4, &[35, 18, 27]),
        ];

        let profile = AffinityProfile::build(&items);

        assert_eq!(profile.genre_ids(), vec![18, 28, 35]);
        assert_eq!(profile.entries()[0].count, 3);
        assert_eq!(profile.entries()[2].count, 2);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let items = vec![movie(1, &[99, 27]), movie(2, &[10749, 53])];
        let profile = AffinityProfile::build(&items);
        assert_eq!(profile.genre_ids(), vec![99, 27, 10749]);
    }

    #[test]
    fn repeated_genre_in_one_item_counts_once() {
        let items = vec![movie(1, &[18, 18, 18]), movie(2, &[28]), movie(3, &[28])];
        let profile = AffinityProfile::build(&items);
        assert_eq!(profile.genre_ids(), vec![28, 18]);
        assert_eq!(profile.entries()[1].count, 1);
    }

    #[test]
    fn never_more_than_three_and_non_increasing() {
        let items: Vec<CatalogItem> = (0..30u64)
            .map(|i| movie(i, &[(i % 7) as u32, (i % 5) as u32 + 100, 200]))
            .collect();

        let profile = AffinityProfile::build(&items);

        assert!(profile.len() <= FAVORITE_GENRES);
        assert!(profile
            .entries()
            .windows(2)
            .all(|w| w[0].count >= w[1].count));
        assert_eq!(profile.genre_ids()[0], 200);
    }

    #[test]
    fn empty_inputs_give_empty_profile() {
        assert!(AffinityProfile::build(&Vec::<CatalogItem>::new()).is_empty());
        assert!(AffinityProfile::build(&vec![movie(1, &[]), movie(2, &[])]).is_empty());
    }

    #[test]
    fn matching() {
        let profile = AffinityProfile::from_genres(&[18, 18, 35]);
        assert_eq!(profile.len(), 2);
        assert!(profile.matches(&movie(1, &[28, 35])));
        assert!(!profile.matches(&movie(2, &[28])));
        assert!(!profile.matches(&movie(3, &[])));
    }
}
