//! The `ReviewSource`/`ReviewStore` traits and supporting query types.
//!
//! The traits are implemented by storage backends (e.g.
//! `groupeats-store-sqlite`). Higher layers (`groupeats-api`, the feed
//! paginator) depend on these abstractions, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  place::PlaceSummary,
  profile::{NewProfile, ProfilePatch, UserProfile},
  review::{GeoPoint, NewReview, Review, ReviewPatch},
};

// ─── Scope ───────────────────────────────────────────────────────────────────

/// Which slice of the review collection a feed covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FeedScope {
  /// Every review, newest first.
  #[default]
  All,
  /// Reviews for one place (opaque external place id).
  ByPlace(String),
  /// Reviews by one author.
  ByAuthor(Uuid),
}

impl FeedScope {
  /// Record-by-record filter, used client-side against unfiltered realtime
  /// snapshots. Paged fetches push the same predicate down to the backend.
  pub fn matches(&self, review: &Review) -> bool {
    match self {
      FeedScope::All => true,
      FeedScope::ByPlace(place_id) => review.place_id == *place_id,
      FeedScope::ByAuthor(author_id) => review.author_id == *author_id,
    }
  }
}

// ─── Pagination types ────────────────────────────────────────────────────────

/// Opaque pagination marker denoting a page boundary. Produced and consumed
/// by the backend; callers never interpret its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(pub String);

/// One fetched page of reviews, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPage {
  pub reviews:     Vec<Review>,
  /// Cursor for the next sequential fetch; absent on an empty page.
  pub next_cursor: Option<PageCursor>,
  /// Explicit more-pages signal when the backend can compute one. Consumers
  /// fall back to the `len == page_size` heuristic when this is `None`.
  pub has_more:    Option<bool>,
}

// ─── Subscription ────────────────────────────────────────────────────────────

/// A live feed of full review-collection snapshots, newest first and
/// unfiltered. Each snapshot fully replaces the previous one; no partial
/// merge is ever delivered. Dropping the subscription releases it.
pub trait ReviewSubscription: Send {
  /// Wait for the next snapshot. Returns `None` once the feed is closed.
  fn next_snapshot(
    &mut self,
  ) -> impl Future<Output = Option<Vec<Review>>> + Send + '_;
}

// ─── Source trait ────────────────────────────────────────────────────────────

/// Read-side contract: cursor-paged fetches and live snapshot subscriptions.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ReviewSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
  type Subscription: ReviewSubscription;

  /// Fetch one page of reviews for `scope`, newest first.
  ///
  /// Pages must be requested strictly sequentially via the returned cursor;
  /// no reordering is performed across pages.
  fn fetch_page(
    &self,
    scope: FeedScope,
    page_size: usize,
    cursor: Option<PageCursor>,
  ) -> impl Future<Output = Result<ReviewPage, Self::Error>> + Send + '_;

  /// Open a live subscription delivering the full current review collection
  /// on every change. The first snapshot arrives without waiting for a write.
  fn subscribe(
    &self,
  ) -> impl Future<Output = Result<Self::Subscription, Self::Error>> + Send + '_;
}

// ─── Store trait ─────────────────────────────────────────────────────────────

/// Full backend contract: the read side plus the review sink, the place
/// query, and profile operations.
pub trait ReviewStore: ReviewSource {
  // ── Reviews — sink ────────────────────────────────────────────────────

  /// Persist a new review and return it. The id, creation timestamp, and
  /// empty likers set are assigned by the store.
  fn create_review(
    &self,
    input: NewReview,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  /// Retrieve a review by id. Returns `None` if not found.
  fn get_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  /// Apply a partial content update. Errors if the review does not exist.
  fn update_review(
    &self,
    id: Uuid,
    patch: ReviewPatch,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  /// Delete a review. Errors if it does not exist.
  fn delete_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Flip `user_id`'s membership in the likers set and return the new liked
  /// state (`true` = now liked).
  fn toggle_like(
    &self,
    id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Place query ───────────────────────────────────────────────────────

  /// Aggregate the full review collection into one summary per place.
  fn place_summaries(
    &self,
  ) -> impl Future<Output = Result<Vec<PlaceSummary>, Self::Error>> + Send + '_;

  /// Summary for one place, or `None` if it has no reviews.
  fn place_summary(
    &self,
    place_id: String,
  ) -> impl Future<Output = Result<Option<PlaceSummary>, Self::Error>> + Send + '_;

  /// Recent reviews within `radius_km` of `center`, at most `limit`.
  /// Filters a bounded recent window rather than running a true geo query.
  fn reviews_near(
    &self,
    center: GeoPoint,
    radius_km: f64,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Create a profile keyed by the auth-provider-assigned `user_id`.
  /// Errors if the id is already taken.
  fn create_profile(
    &self,
    user_id: Uuid,
    input: NewProfile,
  ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send + '_;

  /// Retrieve a profile. An absent document is `None`, not an error.
  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  /// Apply a partial profile update. Errors if the profile does not exist.
  fn update_profile(
    &self,
    user_id: Uuid,
    patch: ProfilePatch,
  ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send + '_;

  /// Add `friend_id` to the friends list; a no-op if already present.
  fn add_friend(
    &self,
    user_id: Uuid,
    friend_id: Uuid,
  ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send + '_;

  /// Remove `friend_id` from the friends list; a no-op if absent.
  fn remove_friend(
    &self,
    user_id: Uuid,
    friend_id: Uuid,
  ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send + '_;
}
