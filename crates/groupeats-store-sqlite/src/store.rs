//! [`SqliteStore`] — the SQLite implementation of [`ReviewStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tokio::sync::broadcast;
use uuid::Uuid;

use groupeats_core::{
  place::{PlaceSummary, aggregate_places},
  profile::{NewProfile, ProfilePatch, UserProfile},
  review::{GeoPoint, NewReview, Review, ReviewPatch},
  store::{
    FeedScope, PageCursor, ReviewPage, ReviewSource, ReviewStore,
    ReviewSubscription,
  },
};

use crate::{
  Error, Result,
  encode::{
    RawProfile, RawReview, decode_cursor, encode_cursor, encode_dt,
    encode_id_list, encode_tags, encode_uuid, now_micros,
  },
  schema::SCHEMA,
};

/// How many recent reviews the radius query scans before filtering.
/// A bounded window in place of a true geo index.
const NEAR_SCAN_WINDOW: i64 = 100;

const REVIEW_COLUMNS: &str = "review_id, author_id, author_name, author_avatar_url, \
   place_id, place_name, place_address, place_tags, \
   description, rating, photo_url, latitude, longitude, created_at, likes";

fn raw_review_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReview> {
  Ok(RawReview {
    review_id:         row.get(0)?,
    author_id:         row.get(1)?,
    author_name:       row.get(2)?,
    author_avatar_url: row.get(3)?,
    place_id:          row.get(4)?,
    place_name:        row.get(5)?,
    place_address:     row.get(6)?,
    place_tags:        row.get(7)?,
    description:       row.get(8)?,
    rating:            row.get(9)?,
    photo_url:         row.get(10)?,
    latitude:          row.get(11)?,
    longitude:         row.get(12)?,
    created_at:        row.get(13)?,
    likes:             row.get(14)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A GroupEats review store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and clones
/// share one change-notification channel.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  changes: broadcast::Sender<()>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::from_connection(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::from_connection(conn).await
  }

  async fn from_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let (changes, _) = broadcast::channel(16);
    let store = Self { conn, changes };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Wake subscribers after a successful review write. Send errors only mean
  /// nobody is listening.
  fn notify_change(&self) {
    let _ = self.changes.send(());
  }

  /// Newest-first review query shared by paging, snapshots, and aggregation.
  ///
  /// `limit` of `-1` means unbounded. Placeholders are numbered so unused
  /// conditions can be dropped from the SQL while the bind list stays fixed
  /// (`?4` is always present).
  async fn query_reviews(
    &self,
    scope: &FeedScope,
    limit: i64,
    keyset: Option<(String, String)>,
  ) -> Result<Vec<Review>> {
    let scope_param: Option<String> = match scope {
      FeedScope::All => None,
      FeedScope::ByPlace(place_id) => Some(place_id.clone()),
      FeedScope::ByAuthor(author_id) => Some(encode_uuid(*author_id)),
    };
    let scope_cond: Option<&'static str> = match scope {
      FeedScope::All => None,
      FeedScope::ByPlace(_) => Some("place_id = ?1"),
      FeedScope::ByAuthor(_) => Some("author_id = ?1"),
    };
    let (keyset_at, keyset_id) = match keyset {
      Some((at, id)) => (Some(at), Some(id)),
      None => (None, None),
    };

    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        let mut conds: Vec<&'static str> = vec![];
        if let Some(c) = scope_cond {
          conds.push(c);
        }
        if keyset_at.is_some() {
          conds.push("(created_at, review_id) < (?2, ?3)");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {REVIEW_COLUMNS}
           FROM reviews
           {where_clause}
           ORDER BY created_at DESC, review_id DESC
           LIMIT ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              scope_param.as_deref(),
              keyset_at.as_deref(),
              keyset_id.as_deref(),
              limit,
            ],
            raw_review_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  /// The full review collection, newest first — the subscription snapshot.
  pub(crate) async fn all_reviews(&self) -> Result<Vec<Review>> {
    self.query_reviews(&FeedScope::All, -1, None).await
  }

  /// Insert a fully-built [`Review`] into the `reviews` table.
  async fn insert_review(&self, review: &Review) -> Result<()> {
    let review_id_str  = encode_uuid(review.review_id);
    let author_id_str  = encode_uuid(review.author_id);
    let author_name    = review.author_name.clone();
    let avatar_url     = review.author_avatar_url.clone();
    let place_id       = review.place_id.clone();
    let place_name     = review.place_name.clone();
    let place_address  = review.place_address.clone();
    let place_tags_str = encode_tags(&review.place_tags)?;
    let description    = review.description.clone();
    let rating         = review.rating;
    let photo_url      = review.photo_url.clone();
    let latitude       = review.location.latitude;
    let longitude      = review.location.longitude;
    let created_at_str = encode_dt(review.created_at);
    let likes_str      = encode_id_list(&review.likes)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reviews (
             review_id, author_id, author_name, author_avatar_url,
             place_id, place_name, place_address, place_tags,
             description, rating, photo_url, latitude, longitude,
             created_at, likes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
          rusqlite::params![
            review_id_str,
            author_id_str,
            author_name,
            avatar_url,
            place_id,
            place_name,
            place_address,
            place_tags_str,
            description,
            rating,
            photo_url,
            latitude,
            longitude,
            created_at_str,
            likes_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, name, email, avatar_url, friends, created_at
               FROM profiles WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawProfile {
                  user_id:    row.get(0)?,
                  name:       row.get(1)?,
                  email:      row.get(2)?,
                  avatar_url: row.get(3)?,
                  friends:    row.get(4)?,
                  created_at: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn write_friends(&self, user_id: Uuid, friends: &[Uuid]) -> Result<()> {
    let id_str      = encode_uuid(user_id);
    let friends_str = encode_id_list(friends)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE profiles SET friends = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, friends_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ReviewSource impl ───────────────────────────────────────────────────────

impl ReviewSource for SqliteStore {
  type Error = Error;
  type Subscription = SqliteSubscription;

  async fn fetch_page(
    &self,
    scope: FeedScope,
    page_size: usize,
    cursor: Option<PageCursor>,
  ) -> Result<ReviewPage> {
    let keyset = cursor.as_ref().map(decode_cursor).transpose()?;

    // One-row lookahead gives an exact has-more signal instead of the
    // page-size heuristic.
    let mut reviews = self
      .query_reviews(&scope, page_size as i64 + 1, keyset)
      .await?;

    let has_more = reviews.len() > page_size;
    reviews.truncate(page_size);

    let next_cursor = reviews
      .last()
      .map(|r| encode_cursor(&encode_dt(r.created_at), &encode_uuid(r.review_id)));

    Ok(ReviewPage {
      reviews,
      next_cursor,
      has_more: Some(has_more),
    })
  }

  async fn subscribe(&self) -> Result<SqliteSubscription> {
    Ok(SqliteSubscription {
      store:  self.clone(),
      rx:     self.changes.subscribe(),
      primed: false,
    })
  }
}

// ─── ReviewStore impl ────────────────────────────────────────────────────────

impl ReviewStore for SqliteStore {
  // ── Reviews — sink ────────────────────────────────────────────────────────

  async fn create_review(&self, input: NewReview) -> Result<Review> {
    let review = Review {
      review_id:         Uuid::new_v4(),
      author_id:         input.author_id,
      author_name:       input.author_name,
      author_avatar_url: input.author_avatar_url,
      place_id:          input.place_id,
      place_name:        input.place_name,
      place_address:     input.place_address,
      place_tags:        input.place_tags,
      description:       input.description,
      rating:            input.rating,
      photo_url:         input.photo_url,
      location:          input.location,
      created_at:        now_micros(),
      likes:             Vec::new(),
    };

    self.insert_review(&review).await?;
    self.notify_change();
    Ok(review)
  }

  async fn get_review(&self, id: Uuid) -> Result<Option<Review>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawReview> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = ?1"),
              rusqlite::params![id_str],
              raw_review_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReview::into_review).transpose()
  }

  async fn update_review(&self, id: Uuid, patch: ReviewPatch) -> Result<Review> {
    let id_str      = encode_uuid(id);
    let description = patch.description.clone();
    let rating      = patch.rating;
    let photo_url   = patch.photo_url.clone();

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE reviews SET
             description = COALESCE(?2, description),
             rating      = COALESCE(?3, rating),
             photo_url   = COALESCE(?4, photo_url)
           WHERE review_id = ?1",
          rusqlite::params![id_str, description, rating, photo_url],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::ReviewNotFound(id));
    }

    self.notify_change();
    self
      .get_review(id)
      .await?
      .ok_or(Error::ReviewNotFound(id))
  }

  async fn delete_review(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM reviews WHERE review_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::ReviewNotFound(id));
    }

    self.notify_change();
    Ok(())
  }

  async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
    let review = self
      .get_review(id)
      .await?
      .ok_or(Error::ReviewNotFound(id))?;

    // Set semantics: remove when present, add when absent.
    let mut likes = review.likes;
    let liked = if let Some(pos) = likes.iter().position(|&u| u == user_id) {
      likes.remove(pos);
      false
    } else {
      likes.push(user_id);
      true
    };

    let id_str    = encode_uuid(id);
    let likes_str = encode_id_list(&likes)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE reviews SET likes = ?2 WHERE review_id = ?1",
          rusqlite::params![id_str, likes_str],
        )?;
        Ok(())
      })
      .await?;

    self.notify_change();
    Ok(liked)
  }

  // ── Place query ───────────────────────────────────────────────────────────

  async fn place_summaries(&self) -> Result<Vec<PlaceSummary>> {
    let reviews = self.all_reviews().await?;
    Ok(aggregate_places(&reviews))
  }

  async fn place_summary(&self, place_id: String) -> Result<Option<PlaceSummary>> {
    let reviews = self
      .query_reviews(&FeedScope::ByPlace(place_id), -1, None)
      .await?;
    Ok(aggregate_places(&reviews).into_iter().next())
  }

  async fn reviews_near(
    &self,
    center: GeoPoint,
    radius_km: f64,
    limit: usize,
  ) -> Result<Vec<Review>> {
    let recent = self
      .query_reviews(&FeedScope::All, NEAR_SCAN_WINDOW, None)
      .await?;
    let mut nearby = groupeats_core::geo::within_radius(recent, center, radius_km);
    nearby.truncate(limit);
    Ok(nearby)
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn create_profile(&self, user_id: Uuid, input: NewProfile) -> Result<UserProfile> {
    if self.fetch_profile(user_id).await?.is_some() {
      return Err(Error::ProfileExists(user_id));
    }

    let profile = UserProfile {
      user_id,
      name:       input.name,
      email:      input.email,
      avatar_url: input.avatar_url,
      friends:    Vec::new(),
      created_at: now_micros(),
    };

    let id_str      = encode_uuid(profile.user_id);
    let name        = profile.name.clone();
    let email       = profile.email.clone();
    let avatar_url  = profile.avatar_url.clone();
    let friends_str = encode_id_list(&profile.friends)?;
    let at_str      = encode_dt(profile.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (user_id, name, email, avatar_url, friends, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, email, avatar_url, friends_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
    self.fetch_profile(user_id).await
  }

  async fn update_profile(&self, user_id: Uuid, patch: ProfilePatch) -> Result<UserProfile> {
    let id_str     = encode_uuid(user_id);
    let name       = patch.name.clone();
    let email      = patch.email.clone();
    let avatar_url = patch.avatar_url.clone();

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE profiles SET
             name       = COALESCE(?2, name),
             email      = COALESCE(?3, email),
             avatar_url = COALESCE(?4, avatar_url)
           WHERE user_id = ?1",
          rusqlite::params![id_str, name, email, avatar_url],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::ProfileNotFound(user_id));
    }

    self
      .fetch_profile(user_id)
      .await?
      .ok_or(Error::ProfileNotFound(user_id))
  }

  async fn add_friend(&self, user_id: Uuid, friend_id: Uuid) -> Result<UserProfile> {
    let mut profile = self
      .fetch_profile(user_id)
      .await?
      .ok_or(Error::ProfileNotFound(user_id))?;

    if !profile.friends.contains(&friend_id) {
      profile.friends.push(friend_id);
      self.write_friends(user_id, &profile.friends).await?;
    }

    Ok(profile)
  }

  async fn remove_friend(&self, user_id: Uuid, friend_id: Uuid) -> Result<UserProfile> {
    let mut profile = self
      .fetch_profile(user_id)
      .await?
      .ok_or(Error::ProfileNotFound(user_id))?;

    if let Some(pos) = profile.friends.iter().position(|&f| f == friend_id) {
      profile.friends.remove(pos);
      self.write_friends(user_id, &profile.friends).await?;
    }

    Ok(profile)
  }
}

// ─── Subscription ────────────────────────────────────────────────────────────

/// Live snapshot feed over the in-process change channel.
///
/// The first call to [`ReviewSubscription::next_snapshot`] yields the current
/// collection without waiting for a write; every subsequent call waits for a
/// change notification and recomputes the full snapshot. Dropping the
/// subscription releases it.
pub struct SqliteSubscription {
  store:  SqliteStore,
  rx:     broadcast::Receiver<()>,
  primed: bool,
}

impl SqliteSubscription {
  async fn load(&self) -> Option<Vec<Review>> {
    match self.store.all_reviews().await {
      Ok(reviews) => Some(reviews),
      Err(e) => {
        tracing::warn!(error = %e, "snapshot recompute failed; closing feed");
        None
      }
    }
  }
}

impl ReviewSubscription for SqliteSubscription {
  async fn next_snapshot(&mut self) -> Option<Vec<Review>> {
    if !self.primed {
      self.primed = true;
      return self.load().await;
    }

    match self.rx.recv().await {
      Ok(()) => self.load().await,
      // Snapshots are full recomputes, so missed notifications collapse
      // into the next one.
      Err(broadcast::error::RecvError::Lagged(_)) => self.load().await,
      Err(broadcast::error::RecvError::Closed) => None,
    }
  }
}
