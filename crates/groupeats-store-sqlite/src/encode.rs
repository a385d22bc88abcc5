//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings at fixed micro-second width,
//! so lexicographic column order matches chronological order. List fields
//! (tags, likes, friends) are stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use groupeats_core::{
  profile::UserProfile,
  review::{GeoPoint, Review},
  store::PageCursor,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time truncated to the precision the columns persist, so a record
/// returned from a write compares equal to every later read of its row.
pub fn now_micros() -> DateTime<Utc> {
  Utc::now().trunc_subsecs(6)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Id lists ────────────────────────────────────────────────────────────────

pub fn encode_id_list(ids: &[Uuid]) -> Result<String> {
  let strings: Vec<String> = ids.iter().copied().map(encode_uuid).collect();
  Ok(serde_json::to_string(&strings)?)
}

pub fn decode_id_list(s: &str) -> Result<Vec<Uuid>> {
  let strings: Vec<String> = serde_json::from_str(s)?;
  strings.iter().map(|s| decode_uuid(s)).collect()
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Page cursor ─────────────────────────────────────────────────────────────

/// The opaque cursor encodes the `(created_at, review_id)` keyset boundary of
/// the last row of a page, base64url so it travels safely in query strings.
pub fn encode_cursor(created_at: &str, review_id: &str) -> PageCursor {
  PageCursor(B64.encode(format!("{created_at}|{review_id}")))
}

pub fn decode_cursor(cursor: &PageCursor) -> Result<(String, String)> {
  let malformed = || Error::MalformedCursor(cursor.0.clone());
  let bytes = B64.decode(&cursor.0).map_err(|_| malformed())?;
  let text = String::from_utf8(bytes).map_err(|_| malformed())?;
  let (created_at, review_id) = text.split_once('|').ok_or_else(malformed)?;
  // Validate both halves so a corrupt cursor fails here, not inside a query.
  decode_dt(created_at)?;
  decode_uuid(review_id)?;
  Ok((created_at.to_string(), review_id.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `reviews` row.
pub struct RawReview {
  pub review_id:         String,
  pub author_id:         String,
  pub author_name:       String,
  pub author_avatar_url: String,
  pub place_id:          String,
  pub place_name:        String,
  pub place_address:     String,
  pub place_tags:        String,
  pub description:       String,
  pub rating:            f64,
  pub photo_url:         String,
  pub latitude:          f64,
  pub longitude:         f64,
  pub created_at:        String,
  pub likes:             String,
}

impl RawReview {
  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      review_id:         decode_uuid(&self.review_id)?,
      author_id:         decode_uuid(&self.author_id)?,
      author_name:       self.author_name,
      author_avatar_url: self.author_avatar_url,
      place_id:          self.place_id,
      place_name:        self.place_name,
      place_address:     self.place_address,
      place_tags:        decode_tags(&self.place_tags)?,
      description:       self.description,
      rating:            self.rating,
      photo_url:         self.photo_url,
      location:          GeoPoint {
        latitude:  self.latitude,
        longitude: self.longitude,
      },
      created_at:        decode_dt(&self.created_at)?,
      likes:             decode_id_list(&self.likes)?,
    })
  }
}

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub user_id:    String,
  pub name:       String,
  pub email:      String,
  pub avatar_url: String,
  pub friends:    String,
  pub created_at: String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<UserProfile> {
    Ok(UserProfile {
      user_id:    decode_uuid(&self.user_id)?,
      name:       self.name,
      email:      self.email,
      avatar_url: self.avatar_url,
      friends:    decode_id_list(&self.friends)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
