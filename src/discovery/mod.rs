//! Glue between the catalog, the document store and the recommendation core.

use crate::catalog::{CatalogSource, Listing};
use crate::config::RecommendationSettings;
use crate::library::{build_library, LibraryEntry};
use crate::models::{CatalogItem, MediaKind, WatchlistEntry};
use crate::recommend::{Shelf, ShelfComposer, ShelfPools};
use crate::stats::{profile_stats, ProfileStats};
use crate::store::{ReviewStore, Subscription, WatchlistStore};
use futures::future::join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Listings that feed every shelf, highest priority first.
pub fn pool_listings(kind: MediaKind) -> Vec<Listing> {
    match kind {
        MediaKind::Movie => vec![
            Listing::TopRated,
            Listing::Trending,
            Listing::Upcoming,
            Listing::NowPlaying,
        ],
        MediaKind::Show => vec![
            Listing::TopRated,
            Listing::Trending,
            Listing::Popular,
            Listing::OnTheAir,
        ],
    }
}

/// Listings behind the "New for you" shelf.
pub fn fresh_listings(kind: MediaKind) -> Vec<Listing> {
    match kind {
        MediaKind::Movie => vec![Listing::NowPlaying, Listing::Upcoming],
        MediaKind::Show => vec![Listing::OnTheAir],
    }
}

/// Listings behind the genre shelves. For movies, now playing comes ahead
/// of upcoming here, unlike the personalized pool.
pub fn genre_listings(kind: MediaKind) -> Vec<Listing> {
    match kind {
        MediaKind::Movie => vec![
            Listing::TopRated,
            Listing::Trending,
            Listing::NowPlaying,
            Listing::Upcoming,
        ],
        MediaKind::Show => pool_listings(kind),
    }
}

fn listing_title(listing: &Listing) -> &'static str {
    match listing {
        Listing::Popular => "Popular",
        Listing::TopRated => "Top rated",
        Listing::Trending => "Trending this week",
        Listing::NowPlaying => "Now playing",
        Listing::Upcoming => "Coming soon",
        Listing::OnTheAir => "On the air",
        Listing::TopRatedThisYear(_) => "Best of the year",
        Listing::TopRatedClassics => "Top rated classics",
        Listing::ByGenre(_) => "By genre",
    }
}

/// Everything the home screen shows for one kind.
#[derive(Debug, Clone, Serialize)]
pub struct Feed {
    pub kind: MediaKind,
    pub editorial: Vec<Shelf>,
    pub personalized: Vec<Shelf>,
    pub genres: Vec<Shelf>,
}

/// Listing pages fetched for one kind, in `pool_listings` order.
#[derive(Debug, Clone)]
pub struct FetchedPools {
    kind: MediaKind,
    listings: Vec<(Listing, Vec<CatalogItem>)>,
}

impl FetchedPools {
    pub fn shelf_pools(&self) -> ShelfPools {
        ShelfPools {
            kind: self.kind,
            general: self.listings.iter().map(|(_, items)| items.clone()).collect(),
            fresh: self.pick(&fresh_listings(self.kind)),
            genre: self.pick(&genre_listings(self.kind)),
        }
    }

    /// Pools for `wanted`, in that order. Listings never fetched are skipped.
    fn pick(&self, wanted: &[Listing]) -> Vec<Vec<CatalogItem>> {
        wanted
            .iter()
            .filter_map(|wanted| {
                self.listings
                    .iter()
                    .find(|(listing, _)| listing == wanted)
                    .map(|(_, items)| items.clone())
            })
            .collect()
    }

    fn editorial(&self, limit: usize) -> Vec<Shelf> {
        self.listings
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(listing, items)| Shelf {
                title: listing_title(listing).to_string(),
                kind: self.kind,
                items: items.iter().take(limit).cloned().collect(),
            })
            .collect()
    }
}

pub struct DiscoveryService<C: CatalogSource> {
    catalog: Arc<C>,
    watchlist: WatchlistStore,
    reviews: ReviewStore,
    settings: RecommendationSettings,
}

impl<C: CatalogSource> DiscoveryService<C> {
    pub fn new(
        catalog: Arc<C>,
        watchlist: WatchlistStore,
        reviews: ReviewStore,
        settings: RecommendationSettings,
    ) -> Self {
        Self {
            catalog,
            watchlist,
            reviews,
            settings,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn watchlist(&self) -> &WatchlistStore {
        &self.watchlist
    }

    pub fn reviews(&self) -> &ReviewStore {
        &self.reviews
    }

    fn composer(&self, kind: MediaKind) -> ShelfComposer {
        ShelfComposer::new(kind, self.settings.clone())
    }

    /// Fetches the first page of every pool listing concurrently. A failed
    /// listing becomes an empty pool.
    #[instrument(skip(self))]
    pub async fn fetch_pools(&self, kind: MediaKind) -> FetchedPools {
        let listings = pool_listings(kind);
        let pages = join_all(
            listings
                .iter()
                .map(|listing| self.catalog.pool(kind, listing)),
        )
        .await;

        let listings: Vec<(Listing, Vec<CatalogItem>)> = listings.into_iter().zip(pages).collect();
        debug!(
            kind = %kind,
            candidates = listings.iter().map(|(_, p)| p.len()).sum::<usize>(),
            "Fetched candidate pools"
        );
        FetchedPools { kind, listings }
    }

    /// Records for the newest `max_saved_lookups` ids. Failed lookups are
    /// dropped.
    pub async fn saved_items(&self, kind: MediaKind, ids: &[u64]) -> Vec<CatalogItem> {
        let capped = &ids[..ids.len().min(self.settings.max_saved_lookups)];
        if capped.len() < ids.len() {
            debug!(kind = %kind, saved = ids.len(), looked_up = capped.len(), "Capping saved item lookups");
        }
        self.catalog.items(kind, capped).await
    }

    /// Personalized shelves for an explicit list of saved ids, newest first.
    pub async fn recommend(&self, kind: MediaKind, saved_ids: &[u64]) -> Vec<Shelf> {
        let (pools, saved_items) =
            futures::join!(self.fetch_pools(kind), self.saved_items(kind, saved_ids));
        let saved: HashSet<u64> = saved_ids.iter().copied().collect();

        self.composer(kind)
            .personalized(&pools.shelf_pools(), &saved_items, &saved)
    }

    /// Editorial, personalized and genre shelves for a user.
    #[instrument(skip(self))]
    pub async fn feed(&self, kind: MediaKind, user_id: &str) -> Feed {
        let ids = saved_ids_newest_first(&self.watchlist.entries(user_id), kind);
        let (pools, saved_items) =
            futures::join!(self.fetch_pools(kind), self.saved_items(kind, &ids));

        let composer = self.composer(kind);
        let shelf_pools = pools.shelf_pools();
        let saved: HashSet<u64> = ids.iter().copied().collect();

        let feed = Feed {
            kind,
            editorial: pools.editorial(self.settings.display_limit),
            personalized: composer.personalized(&shelf_pools, &saved_items, &saved),
            genres: composer.genre_shelves(&shelf_pools),
        };
        info!(
            "Built {} feed for {}: {} editorial, {} personalized, {} genre shelves",
            kind,
            user_id,
            feed.editorial.len(),
            feed.personalized.len(),
            feed.genres.len()
        );
        feed
    }

    /// Recomputes personalized shelves on every watchlist snapshot and sends
    /// them to `updates`. Pools are fetched once; saved records are cached
    /// for the lifetime of the loop. Returns when the subscription ends or
    /// the receiver is dropped.
    pub async fn follow_watchlist(
        &self,
        kind: MediaKind,
        mut subscription: Subscription<WatchlistEntry>,
        updates: mpsc::Sender<Vec<Shelf>>,
    ) {
        let pools = self.fetch_pools(kind).await.shelf_pools();
        let composer = self.composer(kind);
        let mut cache: HashMap<u64, CatalogItem> = HashMap::new();

        while let Some(entries) = subscription.next().await {
            let ids = saved_ids_newest_first(&entries, kind);
            let looked_up = &ids[..ids.len().min(self.settings.max_saved_lookups)];

            let missing: Vec<u64> = looked_up
                .iter()
                .copied()
                .filter(|id| !cache.contains_key(id))
                .collect();
            if !missing.is_empty() {
                for item in self.catalog.items(kind, &missing).await {
                    cache.insert(item.id, item);
                }
            }

            let saved_items: Vec<CatalogItem> = looked_up
                .iter()
                .filter_map(|id| cache.get(id).cloned())
                .collect();
            let saved: HashSet<u64> = ids.iter().copied().collect();

            let shelves = composer.personalized(&pools, &saved_items, &saved);
            debug!(kind = %kind, saved = ids.len(), shelves = shelves.len(), "Recomputed shelves");

            if updates.send(shelves).await.is_err() {
                debug!(kind = %kind, "Shelf receiver dropped, stopping");
                return;
            }
        }

        debug!(kind = %kind, "Watchlist subscription ended");
    }

    /// The user's watchlist joined with catalog records.
    pub async fn library(&self, user_id: &str) -> Vec<LibraryEntry> {
        let entries = self.watchlist.entries(user_id);
        let keys: Vec<(MediaKind, u64)> = entries.iter().map(|e| (e.kind, e.ref_id)).collect();
        let items = self.resolve(&keys).await;
        build_library(&entries, &items)
    }

    pub async fn profile_stats(&self, user_id: &str) -> ProfileStats {
        let reviews = self.reviews.user_reviews(user_id);
        let entries = self.watchlist.entries(user_id);

        let keys: Vec<(MediaKind, u64)> = reviews
            .iter()
            .map(|r| (r.kind, r.ref_id))
            .chain(
                entries
                    .iter()
                    .filter(|e| e.kind == MediaKind::Movie)
                    .map(|e| (e.kind, e.ref_id)),
            )
            .collect();
        let items = self.resolve(&keys).await;

        profile_stats(&reviews, &entries, &items)
    }

    /// Looks up records for mixed-kind keys, both kinds at once.
    async fn resolve(&self, keys: &[(MediaKind, u64)]) -> Vec<CatalogItem> {
        let ids_of = |kind: MediaKind| -> Vec<u64> {
            let mut seen = HashSet::new();
            keys.iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, id)| *id)
                .filter(|id| seen.insert(*id))
                .collect()
        };
        let movie_ids = ids_of(MediaKind::Movie);
        let show_ids = ids_of(MediaKind::Show);

        let (mut movies, shows) = futures::join!(
            self.catalog.items(MediaKind::Movie, &movie_ids),
            self.catalog.items(MediaKind::Show, &show_ids)
        );
        movies.extend(shows);
        movies
    }
}

fn saved_ids_newest_first(entries: &[WatchlistEntry], kind: MediaKind) -> Vec<u64> {
    entries
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.ref_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_listings_are_pool_listings() {
        for kind in [MediaKind::Movie, MediaKind::Show] {
            let pools = pool_listings(kind);
            assert!(fresh_listings(kind).iter().all(|l| pools.contains(l)));
            assert!(genre_listings(kind).iter().all(|l| pools.contains(l)));
            assert!(pools.iter().all(|l| l.supports(kind)));
        }
    }

    #[test]
    fn shelf_pools_split_fresh_listings() {
        let movie = |id| CatalogItem::new(MediaKind::Movie, id);
        let fetched = FetchedPools {
            kind: MediaKind::Movie,
            listings: vec![
                (Listing::TopRated, vec![movie(1)]),
                (Listing::Trending, vec![]),
                (Listing::Upcoming, vec![movie(3)]),
                (Listing::NowPlaying, vec![movie(4)]),
            ],
        };

        let pools = fetched.shelf_pools();
        assert_eq!(pools.general.len(), 4);
        assert_eq!(pools.fresh, vec![vec![movie(4)], vec![movie(3)]]);
        assert_eq!(
            pools.genre,
            vec![vec![movie(1)], vec![], vec![movie(4)], vec![movie(3)]]
        );

        let titles: Vec<String> = fetched.editorial(20).into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Top rated", "Coming soon", "Now playing"]);
    }
}
