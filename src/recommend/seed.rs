use super::aggregate::CandidateAggregator;
use super::profile::AffinityProfile;
use crate::models::CatalogItem;
use std::collections::HashSet;

/// The saved item with the latest release date; the first item when nothing
/// is dated. Earlier items win ties.
pub fn pick_seed(saved: &[CatalogItem]) -> Option<&CatalogItem> {
    let newest = saved
        .iter()
        .filter(|item| item.release_date.is_some())
        .fold(None::<&CatalogItem>, |best, item| match best {
            Some(b) if b.release_date >= item.release_date => Some(b),
            _ => Some(item),
        });

    newest.or_else(|| saved.first())
}

/// Candidates sharing a genre with `seed`, minus the seed and saved ids.
/// A seed without genres yields nothing.
pub fn because_you_liked<P: AsRef<[CatalogItem]>>(
    aggregator: &CandidateAggregator,
    seed: &CatalogItem,
    pools: &[P],
    saved: &HashSet<u64>,
) -> Vec<CatalogItem> {
    if seed.genre_ids.is_empty() {
        return Vec::new();
    }

    let mut excluded = saved.clone();
    excluded.insert(seed.id);

    aggregator.aggregate(pools, &excluded, &AffinityProfile::from_genres(&seed.genre_ids))
}
