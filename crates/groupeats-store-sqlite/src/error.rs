//! Error type for `groupeats-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("malformed page cursor: {0}")]
  MalformedCursor(String),

  #[error("review not found: {0}")]
  ReviewNotFound(uuid::Uuid),

  #[error("profile not found: {0}")]
  ProfileNotFound(uuid::Uuid),

  #[error("profile already exists: {0}")]
  ProfileExists(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
