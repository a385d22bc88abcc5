//! JSON REST API for GroupEats.
//!
//! Exposes an axum [`Router`] backed by any [`groupeats_core::store::ReviewStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", groupeats_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod places;
pub mod profiles;
pub mod reviews;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use groupeats_core::store::ReviewStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ReviewStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Reviews
    .route("/reviews", get(reviews::list::<S>).post(reviews::create::<S>))
    .route("/reviews/near", get(reviews::near::<S>))
    .route(
      "/reviews/{id}",
      get(reviews::get_one::<S>)
        .patch(reviews::update_one::<S>)
        .delete(reviews::delete_one::<S>),
    )
    .route("/reviews/{id}/like", post(reviews::toggle_like::<S>))
    // Places
    .route("/places", get(places::list::<S>))
    .route("/places/{place_id}", get(places::get_one::<S>))
    // Profiles
    .route(
      "/profiles/{user_id}",
      get(profiles::get_one::<S>)
        .put(profiles::create::<S>)
        .patch(profiles::update_one::<S>),
    )
    .route(
      "/profiles/{user_id}/friends",
      post(profiles::add_friend::<S>),
    )
    .route(
      "/profiles/{user_id}/friends/{friend_id}",
      delete(profiles::remove_friend::<S>),
    )
    .with_state(store)
}
