use super::{Collection, Document, Subscription, Toggle};
use crate::error::{StoreError, StoreResult};
use crate::models::{MediaKind, Review, ReviewLike};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const DEFAULT_USER_NAME: &str = "Anonymous user";

impl Document for Review {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Document for ReviewLike {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// What a user submits when rating a title.
#[derive(Debug, Clone, Default)]
pub struct ReviewDraft {
    pub user_id: String,
    pub user_name: Option<String>,
    pub user_photo_url: Option<String>,
    pub rating: u8,
    pub body: Option<String>,
}

/// The "reviews" collection, plus "reviewLikes" holding at most one like
/// per (review, user). One review per (user, kind, id).
#[derive(Clone)]
pub struct ReviewStore {
    reviews: Arc<Collection<Review>>,
    likes: Arc<Collection<ReviewLike>>,
}

impl Default for ReviewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewStore {
    pub fn new() -> Self {
        Self {
            reviews: Arc::new(Collection::new("reviews")),
            likes: Arc::new(Collection::new("reviewLikes")),
        }
    }

    /// Writes the user's review for a title, replacing any earlier one.
    pub fn set_user_review(
        &self,
        kind: MediaKind,
        ref_id: u64,
        draft: ReviewDraft,
    ) -> StoreResult<Review> {
        if draft.user_id.is_empty() {
            return Err(StoreError::MissingUser);
        }
        if !(MIN_RATING..=MAX_RATING).contains(&draft.rating) {
            return Err(StoreError::RatingOutOfRange(draft.rating));
        }

        let review = Review {
            id: Review::document_id(kind, ref_id, &draft.user_id),
            kind,
            ref_id,
            user_name: draft
                .user_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
            user_id: draft.user_id,
            user_photo_url: draft.user_photo_url,
            rating: draft.rating,
            body: draft.body.unwrap_or_default(),
            created_at: Utc::now(),
        };

        info!(
            "Saving {}-star review of {} {} by {}",
            review.rating, kind, ref_id, review.user_id
        );
        self.reviews.upsert(review.clone());
        Ok(review)
    }

    pub fn user_review(&self, kind: MediaKind, ref_id: u64, user_id: &str) -> Option<Review> {
        let id = Review::document_id(kind, ref_id, user_id);
        self.reviews.query(|r| r.id == id).into_iter().next()
    }

    /// Reviews by a user, newest first.
    pub fn user_reviews(&self, user_id: &str) -> Vec<Review> {
        self.reviews.query(|r| r.user_id == user_id)
    }

    /// Live reviews of one title, newest first.
    pub fn listen_reviews(&self, kind: MediaKind, ref_id: u64) -> Subscription<Review> {
        self.reviews
            .subscribe(move |r| r.kind == kind && r.ref_id == ref_id)
    }

    /// Live reviews written by one user, newest first.
    pub fn listen_user_reviews(&self, user_id: &str) -> Subscription<Review> {
        let user_id = user_id.to_string();
        self.reviews.subscribe(move |r| r.user_id == user_id)
    }

    /// Likes the review for the user, or takes the like back.
    pub fn toggle_like(&self, review_id: &str, user_id: &str) -> StoreResult<Toggle> {
        if user_id.is_empty() {
            return Err(StoreError::MissingUser);
        }

        let id = ReviewLike::document_id(review_id, user_id);
        let outcome = self.likes.toggle(
            |l| l.id == id,
            || ReviewLike {
                id: id.clone(),
                review_id: review_id.to_string(),
                user_id: user_id.to_string(),
                created_at: Utc::now(),
            },
        );

        info!("Review like {:?}: {} by {}", outcome, review_id, user_id);
        Ok(outcome)
    }

    /// Ids of the reviews the user has liked.
    pub fn liked_by(&self, user_id: &str) -> HashSet<String> {
        self.likes
            .query(|l| l.user_id == user_id)
            .into_iter()
            .map(|l| l.review_id)
            .collect()
    }

    pub fn like_count(&self, review_id: &str) -> usize {
        self.likes.query(|l| l.review_id == review_id).len()
    }
}
