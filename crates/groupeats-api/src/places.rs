//! Handlers for `/places` endpoints.
//!
//! Places are not stored as rows; each summary is aggregated on demand from
//! the reviews that reference its opaque place id.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use groupeats_core::{place::PlaceSummary, store::ReviewStore};

use crate::error::ApiError;

/// `GET /places` — one summary per reviewed place, feed order.
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<PlaceSummary>>, ApiError>
where
  S: ReviewStore,
{
  let summaries = store
    .place_summaries()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(summaries))
}

/// `GET /places/:place_id` — 404 when the place has no reviews.
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(place_id): Path<String>,
) -> Result<Json<PlaceSummary>, ApiError>
where
  S: ReviewStore,
{
  let summary = store
    .place_summary(place_id.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("place {place_id} has no reviews")))?;
  Ok(Json(summary))
}
