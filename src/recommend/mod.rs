//! Client-side recommendation core.
//!
//! Pure functions over already-fetched catalog data: build a genre affinity
//! profile from saved items, merge and filter candidate pools against it, and
//! compose the shelves shown to the user. Nothing in here does I/O.

mod aggregate;
mod genres;
mod profile;
mod seed;
mod shelves;

use serde::{Deserialize, Serialize};

pub use aggregate::{dedup_pools, CandidateAggregator};
pub use genres::{genre_label, genre_sections, MOVIE_GENRE_SECTIONS, SHOW_GENRE_SECTIONS};
pub use profile::{genre_counts, AffinityProfile, GenreCount, FAVORITE_GENRES};
pub use seed::{because_you_liked, pick_seed};
pub use shelves::{Shelf, ShelfComposer, ShelfPools};

/// Maximum number of items on a shelf.
pub const DISPLAY_LIMIT: usize = 20;

/// How a shelf orders its candidates before truncation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShelfOrder {
    /// Keep the order in which candidates were discovered across pools.
    #[default]
    Discovery,
    /// Highest vote average first; unrated titles count as zero.
    VoteAverage,
}
