use super::profile::AffinityProfile;
use super::{ShelfOrder, DISPLAY_LIMIT};
use crate::models::{CatalogItem, MediaKind};
use std::collections::HashSet;
use tracing::debug;

/// Merges pools of the given kind, keeping the first copy of every id.
/// Items of the other kind are skipped.
pub fn dedup_pools<P: AsRef<[CatalogItem]>>(kind: MediaKind, pools: &[P]) -> Vec<&CatalogItem> {
    let mut seen = HashSet::new();
    pools
        .iter()
        .flat_map(|pool| pool.as_ref().iter())
        .filter(|item| item.kind == kind)
        .filter(|item| seen.insert(item.id))
        .collect()
}

/// Turns overlapping catalog pools into one display-ready candidate list.
///
/// 1. Merge pools in order, first copy of an id wins
/// 2. Drop anything already saved
/// 3. Keep candidates sharing a genre with the profile (skipped when the
///    profile is empty)
/// 4. Optionally sort by vote average, then cut to the display limit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateAggregator {
    kind: MediaKind,
    limit: usize,
    order: ShelfOrder,
}

impl CandidateAggregator {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            limit: DISPLAY_LIMIT,
            order: ShelfOrder::Discovery,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_order(mut self, order: ShelfOrder) -> Self {
        self.order = order;
        self
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn aggregate<P: AsRef<[CatalogItem]>>(
        &self,
        pools: &[P],
        saved: &HashSet<u64>,
        profile: &AffinityProfile,
    ) -> Vec<CatalogItem> {
        self.aggregate_where(pools, saved, profile, |_| true)
    }

    /// Same as [`aggregate`](Self::aggregate) with an extra shelf-specific filter.
    pub fn aggregate_where<P, F>(
        &self,
        pools: &[P],
        saved: &HashSet<u64>,
        profile: &AffinityProfile,
        keep: F,
    ) -> Vec<CatalogItem>
    where
        P: AsRef<[CatalogItem]>,
        F: Fn(&CatalogItem) -> bool,
    {
        let unique = dedup_pools(self.kind, pools);
        let unique_count = unique.len();

        let mut candidates: Vec<CatalogItem> = unique
            .into_iter()
            .filter(|item| !saved.contains(&item.id))
            .filter(|item| profile.is_empty() || profile.matches(item))
            .filter(|item| keep(item))
            .cloned()
            .collect();

        if self.order == ShelfOrder::VoteAverage {
            candidates.sort_by(|a, b| b.score().total_cmp(&a.score()));
        }
        candidates.truncate(self.limit);

        debug!(
            kind = %self.kind,
            pools = pools.len(),
            unique = unique_count,
            kept = candidates.len(),
            "Aggregated candidates"
        );
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64, genres: &[u32]) -> CatalogItem {
        CatalogItem::new(MediaKind::Movie, id).with_genres(genres)
    }

    fn ids(items: &[CatalogItem]) -> Vec<u64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn filters_by_profile_and_first_pool_wins() {
        let pools = vec![
            vec![movie(1, &[18]), movie(2, &[28])],
            vec![movie(2, &[28]), movie(3, &[18])],
        ];
        let profile = AffinityProfile::from_genres(&[18]);

        let out = CandidateAggregator::new(MediaKind::Movie).aggregate(
            &pools,
            &HashSet::new(),
            &profile,
        );

        assert_eq!(ids(&out), vec![1, 3]);
    }

    #[test]
    fn duplicate_keeps_earliest_copy() {
        let early = movie(7, &[18]).with_title("early");
        let late = movie(7, &[18]).with_title("late");
        let pools = vec![vec![movie(1, &[18])], vec![early], vec![late]];

        let out = CandidateAggregator::new(MediaKind::Movie).aggregate(
            &pools,
            &HashSet::new(),
            &AffinityProfile::default(),
        );

        assert_eq!(ids(&out), vec![1, 7]);
        assert_eq!(out[1].display_title(), "early");
    }

    #[test]
    fn saved_items_are_excluded_with_empty_profile() {
        let pools = vec![vec![movie(5, &[18]), movie(6, &[28])]];
        let saved: HashSet<u64> = [5].into_iter().collect();

        let out = CandidateAggregator::new(MediaKind::Movie).aggregate(
            &pools,
            &saved,
            &AffinityProfile::default(),
        );

        assert_eq!(ids(&out), vec![6]);
    }

    #[test]
    fn saved_items_never_appear_in_any_pool_position() {
        let pools = vec![
            vec![movie(1, &[18]), movie(2, &[18])],
            vec![movie(3, &[18]), movie(1, &[18])],
        ];
        let saved: HashSet<u64> = [1, 3].into_iter().collect();
        let profile = AffinityProfile::from_genres(&[18]);

        let out = CandidateAggregator::new(MediaKind::Movie).aggregate(&pools, &saved, &profile);

        assert!(out.iter().all(|i| !saved.contains(&i.id)));
        assert_eq!(ids(&out), vec![2]);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let pools = vec![
            (1..40).map(|i| movie(i, &[(i % 4) as u32])).collect::<Vec<_>>(),
            (20..60).map(|i| movie(i, &[(i % 3) as u32])).collect::<Vec<_>>(),
        ];
        let saved: HashSet<u64> = [3, 9, 27].into_iter().collect();
        let profile = AffinityProfile::from_genres(&[1, 2]);
        let aggregator = CandidateAggregator::new(MediaKind::Movie).with_order(ShelfOrder::VoteAverage);

        let first = aggregator.aggregate(&pools, &saved, &profile);
        let second = aggregator.aggregate(&pools, &saved, &profile);

        assert_eq!(first, second);
    }

    #[test]
    fn truncates_to_display_limit_in_dedup_order() {
        let pool: Vec<CatalogItem> = (1..=30).map(|i| movie(i, &[18])).collect();

        let out = CandidateAggregator::new(MediaKind::Movie).aggregate(
            &[pool],
            &HashSet::new(),
            &AffinityProfile::default(),
        );

        assert_eq!(out.len(), DISPLAY_LIMIT);
        assert_eq!(ids(&out), (1..=20).collect::<Vec<u64>>());
    }

    #[test]
    fn vote_average_order_sorts_before_truncating() {
        let pool = vec![
            movie(1, &[18]).with_vote_average(6.1),
            movie(2, &[18]),
            movie(3, &[18]).with_vote_average(8.7),
            movie(4, &[18]).with_vote_average(6.1),
        ];

        let out = CandidateAggregator::new(MediaKind::Movie)
            .with_order(ShelfOrder::VoteAverage)
            .with_limit(3)
            .aggregate(&[pool], &HashSet::new(), &AffinityProfile::default());

        assert_eq!(ids(&out), vec![3, 1, 4]);
    }

    #[test]
    fn other_kind_is_ignored() {
        let pool = vec![
            CatalogItem::new(MediaKind::Show, 1).with_genres(&[18]),
            movie(1, &[18]),
        ];

        let out = CandidateAggregator::new(MediaKind::Movie).aggregate(
            &[pool],
            &HashSet::new(),
            &AffinityProfile::default(),
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, MediaKind::Movie);
    }

    #[test]
    fn extra_predicate_applies() {
        let pool = vec![
            movie(1, &[18]).with_release_date("1994-09-23"),
            movie(2, &[18]).with_release_date("2010-07-16"),
            movie(3, &[18]),
        ];

        let out = CandidateAggregator::new(MediaKind::Movie).aggregate_where(
            &[pool],
            &HashSet::new(),
            &AffinityProfile::from_genres(&[18]),
            |item| item.year().is_some_and(|y| y < 2000),
        );

        assert_eq!(ids(&out), vec![1]);
    }
}
