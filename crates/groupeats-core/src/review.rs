//! Review types — the fundamental record of the GroupEats store.
//!
//! A review is a single user-authored rating/comment/photo tied to one place.
//! Place fields are denormalised onto the review at creation time; the place
//! itself is an external point of interest identified by an opaque id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Geolocation ─────────────────────────────────────────────────────────────

/// A latitude/longitude pair in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub latitude:  f64,
  pub longitude: f64,
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// A single place review. `review_id` and `created_at` are assigned by the
/// store and never change afterwards. `likes` holds the ids of users who
/// liked the review, duplicate-free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
  pub review_id:         Uuid,

  // Authorship — denormalised from the author's profile at creation time.
  pub author_id:         Uuid,
  pub author_name:       String,
  pub author_avatar_url: String,

  // Target place. `place_id` is an opaque external key (e.g. a place-search
  // provider id); all reviews for one place are expected to share it.
  pub place_id:          String,
  pub place_name:        String,
  pub place_address:     String,
  pub place_tags:        Vec<String>,

  // Content. Rating is nominally 1–5; validated at the API boundary on
  // creation, not re-checked here.
  pub description:       String,
  pub rating:            f64,
  pub photo_url:         String,

  pub location:          GeoPoint,

  pub created_at:        DateTime<Utc>,
  pub likes:             Vec<Uuid>,
}

impl Review {
  /// Whether `user_id` is in the likers set.
  pub fn liked_by(&self, user_id: Uuid) -> bool {
    self.likes.contains(&user_id)
  }
}

// ─── NewReview ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::ReviewStore::create_review`].
/// `review_id`, `created_at`, and the (empty) likers set are always assigned
/// by the store; they are not accepted from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
  pub author_id:         Uuid,
  pub author_name:       String,
  pub author_avatar_url: String,

  pub place_id:          String,
  pub place_name:        String,
  pub place_address:     String,
  #[serde(default)]
  pub place_tags:        Vec<String>,

  pub description:       String,
  pub rating:            f64,
  pub photo_url:         String,

  pub location:          GeoPoint,
}

// ─── ReviewPatch ─────────────────────────────────────────────────────────────

/// Partial update for an existing review. Identity, authorship, place, and
/// creation metadata are immutable; only the content fields can change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewPatch {
  pub description: Option<String>,
  pub rating:      Option<f64>,
  pub photo_url:   Option<String>,
}

impl ReviewPatch {
  pub fn is_empty(&self) -> bool {
    self.description.is_none() && self.rating.is_none() && self.photo_url.is_none()
  }
}
