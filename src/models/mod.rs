use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Movie or show. Catalog identifiers are scoped per kind.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaKind {
    #[default]
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "tv", alias = "show")]
    Show,
}

impl MediaKind {
    /// Wire name used by TMDB paths and stored documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: u32,
    pub name: Option<String>,
}

/// A movie or show as returned by the catalog. Optional fields stay `None`
/// when the provider omits them or sends something unusable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: u64,
    pub kind: MediaKind,
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub genre_ids: Vec<u32>,
    pub genres: Vec<Genre>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl CatalogItem {
    pub fn new(kind: MediaKind, id: u64) -> Self {
        Self {
            id,
            kind,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_genres(mut self, genre_ids: &[u32]) -> Self {
        self.genre_ids = genre_ids.to_vec();
        self
    }

    pub fn with_release_date(mut self, date: &str) -> Self {
        self.release_date = parse_partial_date(date);
        self
    }

    pub fn with_vote_average(mut self, vote_average: f64) -> Self {
        self.vote_average = Some(vote_average);
        self
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    pub fn year(&self) -> Option<i32> {
        self.release_date.map(|d| d.year())
    }

    /// Vote average with absent scores ranked as zero.
    pub fn score(&self) -> f64 {
        self.vote_average.unwrap_or(0.0)
    }

    pub fn shares_genre_with(&self, genre_ids: &[u32]) -> bool {
        self.genre_ids.iter().any(|g| genre_ids.contains(g))
    }
}

/// Parses `YYYY`, `YYYY-MM` or `YYYY-MM-DD`. Missing month/day default to 1.
pub fn parse_partial_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut parts = raw.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    let day: u32 = match parts.next() {
        Some(d) => d.get(..2).unwrap_or(d).parse().ok()?,
        None => 1,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Pagination envelope used by every TMDB listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            results: self.results.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub key: String,
    pub name: Option<String>,
    pub site: String,
    pub video_type: String,
    pub official: bool,
}

/// Detail page data: the catalog record plus related sub-resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDetails {
    pub item: CatalogItem,
    pub tagline: Option<String>,
    pub runtime: Option<u32>,
    pub number_of_seasons: Option<u32>,
    pub cast: Vec<String>,
    pub creators: Vec<String>,
    pub trailer: Option<Video>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub id: String,
    pub user_id: String,
    pub kind: MediaKind,
    pub ref_id: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: String,
    pub kind: MediaKind,
    pub ref_id: u64,
    pub user_id: String,
    pub user_name: String,
    pub user_photo_url: Option<String>,
    pub rating: u8,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// One user's like on one review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewLike {
    pub id: String,
    pub review_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewLike {
    pub fn document_id(review_id: &str, user_id: &str) -> String {
        format!("{}:{}", review_id, user_id)
    }
}

impl Review {
    /// Deterministic id, so a second review by the same user replaces the first.
    pub fn document_id(kind: MediaKind, ref_id: u64, user_id: &str) -> String {
        format!("{}_{}_{}", kind, ref_id, user_id)
    }
}
