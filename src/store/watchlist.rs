use super::{Collection, Document, Subscription, Toggle};
use crate::error::{StoreError, StoreResult};
use crate::models::{MediaKind, WatchlistEntry};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

impl Document for WatchlistEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl WatchlistEntry {
    fn is(&self, kind: MediaKind, ref_id: u64, user_id: &str) -> bool {
        self.kind == kind && self.ref_id == ref_id && self.user_id == user_id
    }
}

/// The "watchlist" collection. At most one entry per (user, kind, id).
#[derive(Clone)]
pub struct WatchlistStore {
    entries: Arc<Collection<WatchlistEntry>>,
}

impl Default for WatchlistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchlistStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Collection::new("watchlist")),
        }
    }

    /// Adds the title to the user's watchlist, or removes it if already there.
    pub fn toggle(&self, kind: MediaKind, ref_id: u64, user_id: &str) -> StoreResult<Toggle> {
        if user_id.is_empty() {
            return Err(StoreError::MissingUser);
        }

        let owner = user_id.to_string();
        let outcome = self.entries.toggle(
            |e| e.is(kind, ref_id, user_id),
            || WatchlistEntry {
                id: Uuid::new_v4().to_string(),
                user_id: owner,
                kind,
                ref_id,
                created_at: Utc::now(),
            },
        );

        info!("Watchlist {:?}: {} {} for user {}", outcome, kind, ref_id, user_id);
        Ok(outcome)
    }

    pub fn contains(&self, kind: MediaKind, ref_id: u64, user_id: &str) -> bool {
        !self
            .entries
            .query(|e| e.is(kind, ref_id, user_id))
            .is_empty()
    }

    /// All of the user's entries, newest first.
    pub fn entries(&self, user_id: &str) -> Vec<WatchlistEntry> {
        self.entries.query(|e| e.user_id == user_id)
    }

    /// Ids of the given kind saved by the user.
    pub fn saved_ids(&self, kind: MediaKind, user_id: &str) -> HashSet<u64> {
        self.entries(user_id)
            .into_iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.ref_id)
            .collect()
    }

    /// Live view of the user's whole watchlist, newest first.
    pub fn listen(&self, user_id: &str) -> Subscription<WatchlistEntry> {
        let user_id = user_id.to_string();
        self.entries.subscribe(move |e| e.user_id == user_id)
    }

    /// Live "is this title on my watchlist" flag.
    pub fn listen_status(&self, kind: MediaKind, ref_id: u64, user_id: &str) -> StatusSubscription {
        let user_id = user_id.to_string();
        StatusSubscription {
            inner: self
                .entries
                .subscribe(move |e| e.is(kind, ref_id, &user_id)),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.entries.subscriber_count()
    }
}

pub struct StatusSubscription {
    inner: Subscription<WatchlistEntry>,
}

impl StatusSubscription {
    pub async fn next(&mut self) -> Option<bool> {
        self.inner.next().await.map(|entries| !entries.is_empty())
    }
}
