//! Catalog provider abstraction.
//!
//! The discovery layer only talks to [`CatalogSource`]; `TmdbClient` is the
//! production implementation and tests plug in an in-memory one.

use crate::error::CatalogResult;
use crate::models::{CatalogItem, ItemDetails, MediaKind, Page};
use async_trait::async_trait;
use futures::future::join_all;
use std::fmt;
use tracing::{debug, warn};

/// Named catalog listings. Not every listing exists for both kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Popular,
    TopRated,
    Trending,
    /// Movies only.
    NowPlaying,
    /// Movies only.
    Upcoming,
    /// Shows only.
    OnTheAir,
    /// Best rated titles first released in the given year.
    TopRatedThisYear(i32),
    /// Best rated titles released before 2000.
    TopRatedClassics,
    ByGenre(u32),
}

impl Listing {
    pub fn name(&self) -> &'static str {
        match self {
            Listing::Popular => "popular",
            Listing::TopRated => "top-rated",
            Listing::Trending => "trending",
            Listing::NowPlaying => "now-playing",
            Listing::Upcoming => "upcoming",
            Listing::OnTheAir => "on-the-air",
            Listing::TopRatedThisYear(_) => "top-rated-this-year",
            Listing::TopRatedClassics => "top-rated-classics",
            Listing::ByGenre(_) => "by-genre",
        }
    }

    pub fn supports(&self, kind: MediaKind) -> bool {
        match self {
            Listing::NowPlaying | Listing::Upcoming => kind == MediaKind::Movie,
            Listing::OnTheAir => kind == MediaKind::Show,
            _ => true,
        }
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listing::TopRatedThisYear(year) => write!(f, "{} ({})", self.name(), year),
            Listing::ByGenre(genre) => write!(f, "{} ({})", self.name(), genre),
            _ => f.write_str(self.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W342,
    W500,
    W780,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::Original => "original",
        }
    }
}

/// `{base}{size}{path}`, or `None` when the item has no image.
pub fn image_url(base: &str, path: Option<&str>, size: ImageSize) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}{}{}", base, size.as_str(), p))
}

/// Read-only access to the movie/show metadata provider.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn listing(
        &self,
        kind: MediaKind,
        listing: &Listing,
        page: u32,
    ) -> CatalogResult<Page<CatalogItem>>;

    async fn search(&self, kind: MediaKind, query: &str, page: u32)
        -> CatalogResult<Page<CatalogItem>>;

    async fn item(&self, kind: MediaKind, id: u64) -> CatalogResult<CatalogItem>;

    /// Detail lookup including credits, images and videos.
    async fn details(&self, kind: MediaKind, id: u64) -> CatalogResult<ItemDetails>;

    /// Fetches many records concurrently. Failed lookups are logged and
    /// left out; the survivors keep the order of `ids`.
    async fn items(&self, kind: MediaKind, ids: &[u64]) -> Vec<CatalogItem> {
        let jobs = ids
            .iter()
            .map(|&id| async move { (id, self.item(kind, id).await) });

        let mut items = Vec::with_capacity(ids.len());
        for (id, result) in join_all(jobs).await {
            match result {
                Ok(item) => items.push(item),
                Err(e) => warn!(kind = %kind, id, error = %e, "Catalog lookup failed, skipping"),
            }
        }

        debug!(
            requested = ids.len(),
            resolved = items.len(),
            "Batch catalog lookup finished"
        );
        items
    }

    /// First page of a listing, with failures collapsed to an empty pool.
    async fn pool(&self, kind: MediaKind, listing: &Listing) -> Vec<CatalogItem> {
        match self.listing(kind, listing, 1).await {
            Ok(page) => page.results,
            Err(e) => {
                warn!(kind = %kind, listing = %listing, error = %e, "Listing fetch failed, using empty pool");
                Vec::new()
            }
        }
    }
}
