//! User profiles and the friends list.
//!
//! Authentication itself is the external provider's concern; a profile is the
//! application-side document keyed by the provider-assigned user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's profile document. `user_id` comes from the auth provider and is
/// supplied by the caller at creation; `created_at` is set by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:    Uuid,
  pub name:       String,
  pub email:      String,
  pub avatar_url: String,
  /// Duplicate-free; maintained by add/remove operations on the store.
  pub friends:    Vec<Uuid>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::ReviewStore::create_profile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
  pub name:       String,
  pub email:      String,
  #[serde(default)]
  pub avatar_url: String,
}

/// Partial update for an existing profile. The id, friends list, and creation
/// timestamp are managed by dedicated operations and never patched directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
  pub name:       Option<String>,
  pub email:      Option<String>,
  pub avatar_url: Option<String>,
}
