use super::aggregate::{dedup_pools, CandidateAggregator};
use super::genres::{genre_label, genre_sections};
use super::profile::AffinityProfile;
use super::seed::{because_you_liked, pick_seed};
use super::ShelfOrder;
use crate::config::RecommendationSettings;
use crate::models::{CatalogItem, MediaKind};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// A titled row of catalog items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shelf {
    pub title: String,
    pub kind: MediaKind,
    pub items: Vec<CatalogItem>,
}

/// Listings already fetched for one kind.
#[derive(Debug, Clone, Default)]
pub struct ShelfPools {
    pub kind: MediaKind,
    /// All listings, highest priority first.
    pub general: Vec<Vec<CatalogItem>>,
    /// Listings of new and upcoming titles.
    pub fresh: Vec<Vec<CatalogItem>>,
    /// Listings behind the genre shelves, in their own priority order.
    pub genre: Vec<Vec<CatalogItem>>,
}

impl ShelfPools {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}

pub struct ShelfComposer {
    kind: MediaKind,
    settings: RecommendationSettings,
}

impl ShelfComposer {
    pub fn new(kind: MediaKind, settings: RecommendationSettings) -> Self {
        Self { kind, settings }
    }

    fn aggregator(&self, order: ShelfOrder) -> CandidateAggregator {
        CandidateAggregator::new(self.kind)
            .with_limit(self.settings.display_limit)
            .with_order(order)
    }

    pub fn profile(&self, saved_items: &[CatalogItem]) -> AffinityProfile {
        AffinityProfile::build_top(
            saved_items.iter().filter(|i| i.kind == self.kind),
            self.settings.favorite_genres,
        )
    }

    /// Personalized shelves for a user's saved items. `saved_ids` holds every
    /// saved id of this kind, including ones whose record failed to load.
    /// Returns nothing when the saved items carry no genres.
    pub fn personalized(
        &self,
        pools: &ShelfPools,
        saved_items: &[CatalogItem],
        saved_ids: &HashSet<u64>,
    ) -> Vec<Shelf> {
        let saved_items: Vec<CatalogItem> = saved_items
            .iter()
            .filter(|i| i.kind == self.kind)
            .cloned()
            .collect();

        let profile = self.profile(&saved_items);
        if profile.is_empty() {
            debug!(kind = %self.kind, "No genre profile, skipping personalized shelves");
            return Vec::new();
        }

        let s = &self.settings;
        let mut shelves = Vec::new();

        self.push(
            &mut shelves,
            "Based on your favorite genres".to_string(),
            self.aggregator(s.favorite_genres_order)
                .aggregate(&pools.general, saved_ids, &profile),
        );

        if let Some(seed) = pick_seed(&saved_items) {
            self.push(
                &mut shelves,
                format!("Because you liked {}", seed.display_title()),
                because_you_liked(
                    &self.aggregator(s.because_you_liked_order),
                    seed,
                    &pools.general,
                    saved_ids,
                ),
            );
        }

        self.push(
            &mut shelves,
            "New for you".to_string(),
            self.aggregator(s.new_for_you_order)
                .aggregate(&pools.fresh, saved_ids, &profile),
        );

        let before = s.classics_before_year;
        self.push(
            &mut shelves,
            "Classics you might love".to_string(),
            self.aggregator(s.classics_order).aggregate_where(
                &pools.general,
                saved_ids,
                &profile,
                |item| item.year().is_some_and(|y| y < before),
            ),
        );

        self.push(
            &mut shelves,
            "Top rated for your profile".to_string(),
            self.aggregator(s.top_rated_for_profile_order)
                .aggregate(&pools.general, saved_ids, &profile),
        );

        debug!(kind = %self.kind, shelves = shelves.len(), favorite_genres = ?profile.genre_ids(), "Composed personalized shelves");
        shelves
    }

    /// One shelf per configured genre section, drawn from the genre pools.
    pub fn genre_shelves(&self, pools: &ShelfPools) -> Vec<Shelf> {
        let unique: Vec<CatalogItem> = dedup_pools(self.kind, &pools.genre)
            .into_iter()
            .cloned()
            .collect();

        let mut shelves = Vec::new();
        for &genre_id in genre_sections(self.kind) {
            let items: Vec<CatalogItem> = unique
                .iter()
                .filter(|item| item.genre_ids.contains(&genre_id))
                .take(self.settings.display_limit)
                .cloned()
                .collect();
            self.push(&mut shelves, genre_label(genre_id).to_string(), items);
        }
        shelves
    }

    fn push(&self, shelves: &mut Vec<Shelf>, title: String, items: Vec<CatalogItem>) {
        if items.is_empty() {
            return;
        }
        shelves.push(Shelf {
            title,
            kind: self.kind,
            items,
        });
    }
}
