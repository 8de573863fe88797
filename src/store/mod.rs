//! In-memory document collections with live subscriptions.
//!
//! Mirrors the small surface the app needs from a cloud document database:
//! upsert, delete-by-filter, and `subscribe(filter)` handing back every
//! matching document set as it changes. Each [`Subscription`] owns its
//! receiver; dropping it unsubscribes.

mod reviews;
mod watchlist;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

pub use reviews::{ReviewDraft, ReviewStore, DEFAULT_USER_NAME, MAX_RATING, MIN_RATING};
pub use watchlist::{StatusSubscription, WatchlistStore};

pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

type Docs<D> = Arc<BTreeMap<String, D>>;
type Filter<D> = Arc<dyn Fn(&D) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

pub struct Collection<D: Document> {
    name: &'static str,
    tx: watch::Sender<Docs<D>>,
}

impl<D: Document> Collection<D> {
    pub fn new(name: &'static str) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(BTreeMap::new()));
        Self { name, tx }
    }

    /// Inserts or replaces the document with the same id.
    pub fn upsert(&self, doc: D) {
        let id = doc.id().to_string();
        debug!(collection = self.name, id = %id, "Upserting document");
        self.tx.send_modify(|docs| {
            Arc::make_mut(docs).insert(id, doc);
        });
    }

    /// Removes every document matching `pred` and returns how many went.
    pub fn remove_where(&self, pred: impl Fn(&D) -> bool) -> usize {
        let mut removed = 0;
        self.tx.send_if_modified(|docs| {
            if !docs.values().any(&pred) {
                return false;
            }
            let docs = Arc::make_mut(docs);
            let before = docs.len();
            docs.retain(|_, d| !pred(d));
            removed = before - docs.len();
            true
        });
        if removed > 0 {
            debug!(collection = self.name, removed, "Removed documents");
        }
        removed
    }

    /// Removes all documents matching `pred`, or inserts `make()` when none
    /// matched, as a single update.
    pub fn toggle(&self, pred: impl Fn(&D) -> bool, make: impl FnOnce() -> D) -> Toggle {
        let mut outcome = Toggle::Added;
        self.tx.send_modify(|docs| {
            let docs = Arc::make_mut(docs);
            let before = docs.len();
            docs.retain(|_, d| !pred(d));
            if docs.len() < before {
                outcome = Toggle::Removed;
            } else {
                let doc = make();
                docs.insert(doc.id().to_string(), doc);
            }
        });
        debug!(collection = self.name, outcome = ?outcome, "Toggled document");
        outcome
    }

    /// One-off read of the matching documents, newest first.
    pub fn query(&self, filter: impl Fn(&D) -> bool) -> Vec<D> {
        let docs = self.tx.borrow().clone();
        matching(&docs, &filter)
    }

    pub fn subscribe(&self, filter: impl Fn(&D) -> bool + Send + Sync + 'static) -> Subscription<D> {
        debug!(collection = self.name, "New subscription");
        Subscription {
            rx: self.tx.subscribe(),
            filter: Arc::new(filter),
            primed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

fn matching<D: Document>(docs: &BTreeMap<String, D>, filter: &dyn Fn(&D) -> bool) -> Vec<D> {
    let mut out: Vec<D> = docs.values().filter(|d| filter(d)).cloned().collect();
    out.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
    out
}

/// Live view over the documents of a collection that match a filter.
pub struct Subscription<D: Document> {
    rx: watch::Receiver<Docs<D>>,
    filter: Filter<D>,
    primed: bool,
}

impl<D: Document> Subscription<D> {
    /// Matching documents right now, newest first.
    pub fn current(&mut self) -> Vec<D> {
        let docs = self.rx.borrow_and_update().clone();
        matching(&docs, &*self.filter)
    }

    /// The first call yields the current set immediately; later calls wait
    /// for the collection to change. `None` once the collection is gone.
    ///
    /// Every write wakes subscribers, so consecutive snapshots may be equal.
    pub async fn next(&mut self) -> Option<Vec<D>> {
        if !self.primed {
            self.primed = true;
            return Some(self.current());
        }
        self.rx.changed().await.ok()?;
        Some(self.current())
    }
}
