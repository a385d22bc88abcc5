//! Handlers for `/reviews` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/reviews` | Paged; `?place_id=` / `?author_id=` / `?page_size=` / `?cursor=` |
//! | `POST`   | `/reviews` | Body: a new review; rating validated 1–5 |
//! | `GET`    | `/reviews/near` | `?latitude=&longitude=[&radius_km=][&limit=]` |
//! | `GET`    | `/reviews/:id` | 404 if not found |
//! | `PATCH`  | `/reviews/:id` | Partial content update |
//! | `DELETE` | `/reviews/:id` | |
//! | `POST`   | `/reviews/:id/like` | Body: `{"user_id":...}`; toggles |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use groupeats_core::{
  review::{GeoPoint, NewReview, Review, ReviewPatch},
  store::{FeedScope, PageCursor, ReviewPage, ReviewStore},
  validate,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> ApiError {
  ApiError::Store(Box::new(e))
}

// ─── Paged list ──────────────────────────────────────────────────────────────

/// Requested page sizes are clamped to this bound; a page is one screenful,
/// not a bulk export.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize, Default)]
pub struct PageParams {
  /// Restrict to one place. Mutually exclusive with `author_id`.
  pub place_id:  Option<String>,
  /// Restrict to one author.
  pub author_id: Option<Uuid>,
  pub page_size: Option<usize>,
  /// Opaque cursor from a previous page's `next_cursor`.
  pub cursor:    Option<String>,
}

/// `GET /reviews[?place_id=...|author_id=...][&page_size=...][&cursor=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<PageParams>,
) -> Result<Json<ReviewPage>, ApiError>
where
  S: ReviewStore,
{
  let scope = match (params.place_id, params.author_id) {
    (Some(_), Some(_)) => {
      return Err(ApiError::BadRequest(
        "place_id and author_id are mutually exclusive".into(),
      ));
    }
    (Some(place_id), None) => FeedScope::ByPlace(place_id),
    (None, Some(author_id)) => FeedScope::ByAuthor(author_id),
    (None, None) => FeedScope::All,
  };

  let page_size = params
    .page_size
    .unwrap_or(groupeats_core::feed::DEFAULT_PAGE_SIZE);
  if page_size == 0 {
    return Err(ApiError::BadRequest("page_size must be positive".into()));
  }
  let page_size = page_size.min(MAX_PAGE_SIZE);

  let page = store
    .fetch_page(scope, page_size, params.cursor.map(PageCursor))
    .await
    .map_err(store_err)?;
  Ok(Json(page))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /reviews` — body: a [`NewReview`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewReview>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore,
{
  if !validate::is_valid_rating(body.rating) {
    return Err(ApiError::BadRequest(format!(
      "rating must be between 1 and 5, got {}",
      body.rating
    )));
  }
  if !validate::is_present(&body.place_id) {
    return Err(ApiError::BadRequest("place_id must not be empty".into()));
  }
  if !validate::is_present(&body.place_name) {
    return Err(ApiError::BadRequest("place_name must not be empty".into()));
  }
  if !validate::is_present(&body.author_name) {
    return Err(ApiError::BadRequest("author_name must not be empty".into()));
  }
  if !validate::is_present(&body.description) {
    return Err(ApiError::BadRequest("description must not be empty".into()));
  }

  let review = store.create_review(body).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(review)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /reviews/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Review>, ApiError>
where
  S: ReviewStore,
{
  let review = store
    .get_review(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("review {id} not found")))?;
  Ok(Json(review))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /reviews/:id` — body: a [`ReviewPatch`].
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<ReviewPatch>,
) -> Result<Json<Review>, ApiError>
where
  S: ReviewStore,
{
  if patch.is_empty() {
    return Err(ApiError::BadRequest("empty patch".into()));
  }
  if let Some(rating) = patch.rating
    && !validate::is_valid_rating(rating)
  {
    return Err(ApiError::BadRequest(format!(
      "rating must be between 1 and 5, got {rating}"
    )));
  }

  store
    .get_review(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("review {id} not found")))?;

  let review = store.update_review(id, patch).await.map_err(store_err)?;
  Ok(Json(review))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /reviews/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ReviewStore,
{
  store
    .get_review(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("review {id} not found")))?;

  store.delete_review(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Like toggle ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LikeBody {
  pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
  /// The user's liked state after the toggle.
  pub liked: bool,
}

/// `POST /reviews/:id/like` — body: `{"user_id":"..."}`
pub async fn toggle_like<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<LikeBody>,
) -> Result<Json<LikeResponse>, ApiError>
where
  S: ReviewStore,
{
  store
    .get_review(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("review {id} not found")))?;

  let liked = store
    .toggle_like(id, body.user_id)
    .await
    .map_err(store_err)?;
  Ok(Json(LikeResponse { liked }))
}

// ─── Nearby ──────────────────────────────────────────────────────────────────

const DEFAULT_RADIUS_KM: f64 = 5.0;
const DEFAULT_NEAR_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct NearParams {
  pub latitude:  f64,
  pub longitude: f64,
  pub radius_km: Option<f64>,
  pub limit:     Option<usize>,
}

/// `GET /reviews/near?latitude=...&longitude=...[&radius_km=...][&limit=...]`
pub async fn near<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<NearParams>,
) -> Result<Json<Vec<Review>>, ApiError>
where
  S: ReviewStore,
{
  let radius_km = params.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
  if !radius_km.is_finite() || radius_km <= 0.0 {
    return Err(ApiError::BadRequest("radius_km must be positive".into()));
  }

  let reviews = store
    .reviews_near(
      GeoPoint {
        latitude:  params.latitude,
        longitude: params.longitude,
      },
      radius_km,
      params.limit.unwrap_or(DEFAULT_NEAR_LIMIT),
    )
    .await
    .map_err(store_err)?;
  Ok(Json(reviews))
}
