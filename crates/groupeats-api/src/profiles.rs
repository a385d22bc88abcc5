//! Handlers for `/profiles` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/profiles/:user_id` | `200 null` when absent, never 404 |
//! | `PUT`    | `/profiles/:user_id` | Create; id comes from the auth provider |
//! | `PATCH`  | `/profiles/:user_id` | Partial update |
//! | `POST`   | `/profiles/:user_id/friends` | Body: `{"friend_id":...}` |
//! | `DELETE` | `/profiles/:user_id/friends/:friend_id` | |
//!
//! An absent profile reads as `null` rather than an error: clients probe for
//! profiles of authors and likers they encounter in the feed, and a missing
//! document is an ordinary outcome there.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use groupeats_core::{
  profile::{NewProfile, ProfilePatch, UserProfile},
  store::ReviewStore,
  validate,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> ApiError {
  ApiError::Store(Box::new(e))
}

async fn require_profile<S>(store: &S, user_id: Uuid) -> Result<UserProfile, ApiError>
where
  S: ReviewStore,
{
  store
    .get_profile(user_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("profile {user_id} not found")))
}

// ─── Get ─────────────────────────────────────────────────────────────────────

/// `GET /profiles/:user_id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<Option<UserProfile>>, ApiError>
where
  S: ReviewStore,
{
  let profile = store.get_profile(user_id).await.map_err(store_err)?;
  Ok(Json(profile))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `PUT /profiles/:user_id` — body: a [`NewProfile`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
  Json(body): Json<NewProfile>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore,
{
  if !validate::is_present(&body.name) {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  if !validate::is_valid_email(&body.email) {
    return Err(ApiError::BadRequest(format!(
      "invalid email: {}",
      body.email
    )));
  }
  if store
    .get_profile(user_id)
    .await
    .map_err(store_err)?
    .is_some()
  {
    return Err(ApiError::BadRequest(format!(
      "profile {user_id} already exists"
    )));
  }

  let profile = store
    .create_profile(user_id, body)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /profiles/:user_id` — body: a [`ProfilePatch`].
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
  Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: ReviewStore,
{
  if let Some(email) = &patch.email
    && !validate::is_valid_email(email)
  {
    return Err(ApiError::BadRequest(format!("invalid email: {email}")));
  }

  require_profile(store.as_ref(), user_id).await?;
  let profile = store
    .update_profile(user_id, patch)
    .await
    .map_err(store_err)?;
  Ok(Json(profile))
}

// ─── Friends ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FriendBody {
  pub friend_id: Uuid,
}

/// `POST /profiles/:user_id/friends` — body: `{"friend_id":"..."}`
pub async fn add_friend<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
  Json(body): Json<FriendBody>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: ReviewStore,
{
  if body.friend_id == user_id {
    return Err(ApiError::BadRequest("cannot befriend yourself".into()));
  }

  require_profile(store.as_ref(), user_id).await?;
  let profile = store
    .add_friend(user_id, body.friend_id)
    .await
    .map_err(store_err)?;
  Ok(Json(profile))
}

/// `DELETE /profiles/:user_id/friends/:friend_id`
pub async fn remove_friend<S>(
  State(store): State<Arc<S>>,
  Path((user_id, friend_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: ReviewStore,
{
  require_profile(store.as_ref(), user_id).await?;
  let profile = store
    .remove_friend(user_id, friend_id)
    .await
    .map_err(store_err)?;
  Ok(Json(profile))
}
