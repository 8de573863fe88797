//! Profile statistics derived from a user's reviews and watchlist.

use crate::models::{CatalogItem, MediaKind, Review, WatchlistEntry};
use crate::recommend::genre_label;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

const TOP_RATED_LIMIT: usize = 7;
const RECENT_REVIEWS_LIMIT: usize = 5;
const TOP_GENRES_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreTally {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastAdded {
    pub item: CatalogItem,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileStats {
    pub rated_count: usize,
    pub written_reviews: usize,
    pub watchlist_count: usize,
    /// Rounded to one decimal; `None` without ratings.
    pub average_rating: Option<f64>,
    pub top_rated: Vec<Review>,
    pub recent_reviews: Vec<Review>,
    pub top_genres: Vec<GenreTally>,
    /// Count per star value, 5 down to 1.
    pub rating_histogram: Vec<(u8, usize)>,
    /// Count per calendar year, oldest first.
    pub ratings_per_year: Vec<(i32, usize)>,
    pub last_added: Option<LastAdded>,
}

/// `items` are whatever catalog records were resolved for the reviewed and
/// saved titles; missing ones just don't contribute genres.
pub fn profile_stats(
    reviews: &[Review],
    watchlist: &[WatchlistEntry],
    items: &[CatalogItem],
) -> ProfileStats {
    let by_key: HashMap<(MediaKind, u64), &CatalogItem> =
        items.iter().map(|i| ((i.kind, i.id), i)).collect();

    let average_rating = if reviews.is_empty() {
        None
    } else {
        let sum: u32 = reviews.iter().map(|r| r.rating as u32).sum();
        let avg = sum as f64 / reviews.len() as f64;
        Some((avg * 10.0).round() / 10.0)
    };

    let mut top_rated = reviews.to_vec();
    top_rated.sort_by(|a, b| b.rating.cmp(&a.rating));
    top_rated.truncate(TOP_RATED_LIMIT);

    let mut recent_reviews = reviews.to_vec();
    recent_reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent_reviews.truncate(RECENT_REVIEWS_LIMIT);

    let rating_histogram = (1..=5u8)
        .rev()
        .map(|star| (star, reviews.iter().filter(|r| r.rating == star).count()))
        .collect();

    let mut per_year: BTreeMap<i32, usize> = BTreeMap::new();
    for review in reviews {
        *per_year.entry(review.created_at.year()).or_default() += 1;
    }

    let last_added = watchlist
        .iter()
        .filter(|e| e.kind == MediaKind::Movie)
        .filter_map(|e| by_key.get(&(e.kind, e.ref_id)).map(|item| (e, *item)))
        .fold(None::<(&WatchlistEntry, &CatalogItem)>, |best, cur| match best {
            Some(b) if b.0.created_at >= cur.0.created_at => Some(b),
            _ => Some(cur),
        })
        .map(|(entry, item)| LastAdded {
            item: item.clone(),
            added_at: entry.created_at,
        });

    ProfileStats {
        rated_count: reviews.len(),
        written_reviews: reviews.iter().filter(|r| !r.body.trim().is_empty()).count(),
        watchlist_count: watchlist.len(),
        average_rating,
        top_rated,
        recent_reviews,
        top_genres: top_genres(reviews, &by_key),
        rating_histogram,
        ratings_per_year: per_year.into_iter().collect(),
        last_added,
    }
}

fn top_genres(
    reviews: &[Review],
    by_key: &HashMap<(MediaKind, u64), &CatalogItem>,
) -> Vec<GenreTally> {
    let mut tallies: Vec<GenreTally> = Vec::new();

    for review in reviews {
        let Some(item) = by_key.get(&(review.kind, review.ref_id)) else {
            continue;
        };

        let names: Vec<String> = if item.genres.is_empty() {
            item.genre_ids
                .iter()
                .map(|&id| genre_label(id))
                .filter(|label| *label != "Genre")
                .map(str::to_string)
                .collect()
        } else {
            item.genres.iter().filter_map(|g| g.name.clone()).collect()
        };

        for name in names {
            match tallies.iter_mut().find(|t| t.name == name) {
                Some(t) => t.count += 1,
                None => tallies.push(GenreTally { name, count: 1 }),
            }
        }
    }

    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies.truncate(TOP_GENRES_LIMIT);
    tallies
}
