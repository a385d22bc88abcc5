//! Integration tests for `SqliteStore` against an in-memory database.

use groupeats_core::{
  profile::{NewProfile, ProfilePatch},
  review::{GeoPoint, NewReview, ReviewPatch},
  store::{FeedScope, PageCursor, ReviewSource, ReviewStore, ReviewSubscription},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_review(author_id: Uuid, place_id: &str, rating: f64) -> NewReview {
  NewReview {
    author_id,
    author_name: "Ada".into(),
    author_avatar_url: String::new(),
    place_id: place_id.into(),
    place_name: format!("Place {place_id}"),
    place_address: "1 Example St".into(),
    place_tags: vec!["cafe".into()],
    description: "solid flat white".into(),
    rating,
    photo_url: String::new(),
    location: GeoPoint { latitude: 52.52, longitude: 13.405 },
  }
}

async fn seed_reviews(s: &SqliteStore, count: usize) -> Vec<Uuid> {
  let author = Uuid::new_v4();
  let mut ids = Vec::with_capacity(count);
  for i in 0..count {
    let r = s
      .create_review(new_review(author, &format!("place-{i}"), 4.0))
      .await
      .unwrap();
    ids.push(r.review_id);
  }
  ids
}

// ─── Review CRUD ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_review_round_trips() {
  let s = store().await;
  let author = Uuid::new_v4();

  let created = s.create_review(new_review(author, "p1", 4.5)).await.unwrap();
  assert!(created.likes.is_empty());

  let fetched = s.get_review(created.review_id).await.unwrap().unwrap();
  assert_eq!(fetched.review_id, created.review_id);
  assert_eq!(fetched.author_id, author);
  assert_eq!(fetched.place_id, "p1");
  assert_eq!(fetched.place_tags, vec!["cafe".to_string()]);
  assert_eq!(fetched.rating, 4.5);
  assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn get_review_missing_returns_none() {
  let s = store().await;
  assert!(s.get_review(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_review_patches_only_given_fields() {
  let s = store().await;
  let created = s
    .create_review(new_review(Uuid::new_v4(), "p1", 3.0))
    .await
    .unwrap();

  let updated = s
    .update_review(created.review_id, ReviewPatch {
      rating: Some(5.0),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.rating, 5.0);
  assert_eq!(updated.description, created.description);
  assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn update_missing_review_errors() {
  let s = store().await;
  let err = s
    .update_review(Uuid::new_v4(), ReviewPatch {
      description: Some("x".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ReviewNotFound(_)));
}

#[tokio::test]
async fn delete_review_removes_it() {
  let s = store().await;
  let created = s
    .create_review(new_review(Uuid::new_v4(), "p1", 3.0))
    .await
    .unwrap();

  s.delete_review(created.review_id).await.unwrap();
  assert!(s.get_review(created.review_id).await.unwrap().is_none());

  let err = s.delete_review(created.review_id).await.unwrap_err();
  assert!(matches!(err, Error::ReviewNotFound(_)));
}

// ─── Likes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn toggle_like_round_trips() {
  let s = store().await;
  let review = s
    .create_review(new_review(Uuid::new_v4(), "p1", 4.0))
    .await
    .unwrap();
  let liker = Uuid::new_v4();

  assert!(s.toggle_like(review.review_id, liker).await.unwrap());
  let r = s.get_review(review.review_id).await.unwrap().unwrap();
  assert!(r.liked_by(liker));

  assert!(!s.toggle_like(review.review_id, liker).await.unwrap());
  let r = s.get_review(review.review_id).await.unwrap().unwrap();
  assert!(!r.liked_by(liker));
  assert!(r.likes.is_empty());

  assert!(s.toggle_like(review.review_id, liker).await.unwrap());
}

#[tokio::test]
async fn toggle_like_keeps_other_likers() {
  let s = store().await;
  let review = s
    .create_review(new_review(Uuid::new_v4(), "p1", 4.0))
    .await
    .unwrap();
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

  s.toggle_like(review.review_id, a).await.unwrap();
  s.toggle_like(review.review_id, b).await.unwrap();
  s.toggle_like(review.review_id, a).await.unwrap();

  let r = s.get_review(review.review_id).await.unwrap().unwrap();
  assert_eq!(r.likes, vec![b]);
}

#[tokio::test]
async fn toggle_like_on_missing_review_errors() {
  let s = store().await;
  let err = s
    .toggle_like(Uuid::new_v4(), Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ReviewNotFound(_)));
}

// ─── Pagination ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn page_walk_visits_every_review_once() {
  let s = store().await;
  seed_reviews(&s, 25).await;

  let first = s.fetch_page(FeedScope::All, 20, None).await.unwrap();
  assert_eq!(first.reviews.len(), 20);
  assert_eq!(first.has_more, Some(true));
  let cursor = first.next_cursor.clone().expect("cursor after full page");

  let second = s.fetch_page(FeedScope::All, 20, Some(cursor)).await.unwrap();
  assert_eq!(second.reviews.len(), 5);
  assert_eq!(second.has_more, Some(false));

  let mut seen: Vec<Uuid> = first
    .reviews
    .iter()
    .chain(second.reviews.iter())
    .map(|r| r.review_id)
    .collect();
  assert_eq!(seen.len(), 25);
  seen.sort();
  seen.dedup();
  assert_eq!(seen.len(), 25, "pages overlapped");
}

#[tokio::test]
async fn pages_are_newest_first_without_gaps() {
  let s = store().await;
  seed_reviews(&s, 12).await;

  let page = s.fetch_page(FeedScope::All, 12, None).await.unwrap();
  for pair in page.reviews.windows(2) {
    let a = (pair[0].created_at, pair[0].review_id);
    let b = (pair[1].created_at, pair[1].review_id);
    assert!(a > b, "rows out of order");
  }
}

#[tokio::test]
async fn exact_multiple_reports_no_more_without_empty_page() {
  let s = store().await;
  seed_reviews(&s, 40).await;

  let first = s.fetch_page(FeedScope::All, 20, None).await.unwrap();
  assert_eq!(first.has_more, Some(true));

  // The one-row lookahead sees past the boundary, so the final full page
  // already reports the end.
  let second = s
    .fetch_page(FeedScope::All, 20, first.next_cursor)
    .await
    .unwrap();
  assert_eq!(second.reviews.len(), 20);
  assert_eq!(second.has_more, Some(false));
}

#[tokio::test]
async fn empty_collection_yields_empty_page() {
  let s = store().await;
  let page = s.fetch_page(FeedScope::All, 20, None).await.unwrap();
  assert!(page.reviews.is_empty());
  assert!(page.next_cursor.is_none());
  assert_eq!(page.has_more, Some(false));
}

#[tokio::test]
async fn malformed_cursor_is_rejected() {
  let s = store().await;
  let err = s
    .fetch_page(FeedScope::All, 20, Some(PageCursor("not a cursor".into())))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MalformedCursor(_)));
}

#[tokio::test]
async fn scoped_pages_filter_by_place_and_author() {
  let s = store().await;
  let (ada, ben) = (Uuid::new_v4(), Uuid::new_v4());
  s.create_review(new_review(ada, "p1", 4.0)).await.unwrap();
  s.create_review(new_review(ben, "p1", 3.0)).await.unwrap();
  s.create_review(new_review(ada, "p2", 5.0)).await.unwrap();

  let by_place = s
    .fetch_page(FeedScope::ByPlace("p1".into()), 20, None)
    .await
    .unwrap();
  assert_eq!(by_place.reviews.len(), 2);
  assert!(by_place.reviews.iter().all(|r| r.place_id == "p1"));

  let by_author = s
    .fetch_page(FeedScope::ByAuthor(ada), 20, None)
    .await
    .unwrap();
  assert_eq!(by_author.reviews.len(), 2);
  assert!(by_author.reviews.iter().all(|r| r.author_id == ada));
}

// ─── Place summaries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn place_summaries_group_and_average() {
  let s = store().await;
  let author = Uuid::new_v4();
  s.create_review(new_review(author, "A", 4.0)).await.unwrap();
  s.create_review(new_review(author, "B", 5.0)).await.unwrap();
  s.create_review(new_review(author, "A", 2.0)).await.unwrap();

  let summaries = s.place_summaries().await.unwrap();
  assert_eq!(summaries.len(), 2);

  let a = summaries.iter().find(|p| p.place_id == "A").unwrap();
  assert_eq!(a.review_count(), 2);
  assert!((a.average_rating - 3.0).abs() < 1e-9);

  let b = summaries.iter().find(|p| p.place_id == "B").unwrap();
  assert_eq!(b.review_count(), 1);
  assert!((b.average_rating - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn place_summary_missing_place_is_none() {
  let s = store().await;
  assert!(s.place_summary("nowhere".into()).await.unwrap().is_none());
}

// ─── Radius query ────────────────────────────────────────────────────────────

#[tokio::test]
async fn reviews_near_filters_by_distance() {
  let s = store().await;
  let author = Uuid::new_v4();

  let mut berlin = new_review(author, "berlin", 4.0);
  berlin.location = GeoPoint { latitude: 52.52, longitude: 13.405 };
  s.create_review(berlin).await.unwrap();

  let mut hamburg = new_review(author, "hamburg", 4.0);
  hamburg.location = GeoPoint { latitude: 53.5511, longitude: 9.9937 };
  s.create_review(hamburg).await.unwrap();

  let near = s
    .reviews_near(GeoPoint { latitude: 52.52, longitude: 13.405 }, 50.0, 10)
    .await
    .unwrap();
  assert_eq!(near.len(), 1);
  assert_eq!(near[0].place_id, "berlin");
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_profile() {
  let s = store().await;
  let user = Uuid::new_v4();

  let created = s
    .create_profile(user, NewProfile {
      name:       "Ada".into(),
      email:      "ada@example.com".into(),
      avatar_url: String::new(),
    })
    .await
    .unwrap();
  assert!(created.friends.is_empty());

  let fetched = s.get_profile(user).await.unwrap().unwrap();
  assert_eq!(fetched.user_id, user);
  assert_eq!(fetched.email, "ada@example.com");
  assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn duplicate_profile_id_errors() {
  let s = store().await;
  let user = Uuid::new_v4();
  let input = NewProfile {
    name:       "Ada".into(),
    email:      "ada@example.com".into(),
    avatar_url: String::new(),
  };

  s.create_profile(user, input.clone()).await.unwrap();
  let err = s.create_profile(user, input).await.unwrap_err();
  assert!(matches!(err, Error::ProfileExists(_)));
}

#[tokio::test]
async fn get_profile_missing_returns_none() {
  let s = store().await;
  assert!(s.get_profile(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_profile_patches_fields() {
  let s = store().await;
  let user = Uuid::new_v4();
  s.create_profile(user, NewProfile {
    name:       "Ada".into(),
    email:      "ada@example.com".into(),
    avatar_url: String::new(),
  })
  .await
  .unwrap();

  let updated = s
    .update_profile(user, ProfilePatch {
      name: Some("Ada L.".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.name, "Ada L.");
  assert_eq!(updated.email, "ada@example.com");
}

#[tokio::test]
async fn friends_add_remove_is_idempotent() {
  let s = store().await;
  let (user, friend) = (Uuid::new_v4(), Uuid::new_v4());
  s.create_profile(user, NewProfile {
    name:       "Ada".into(),
    email:      "ada@example.com".into(),
    avatar_url: String::new(),
  })
  .await
  .unwrap();

  let p = s.add_friend(user, friend).await.unwrap();
  assert_eq!(p.friends, vec![friend]);

  // Adding again is a no-op, not a duplicate.
  let p = s.add_friend(user, friend).await.unwrap();
  assert_eq!(p.friends, vec![friend]);

  let p = s.remove_friend(user, friend).await.unwrap();
  assert!(p.friends.is_empty());

  let p = s.remove_friend(user, friend).await.unwrap();
  assert!(p.friends.is_empty());
}

#[tokio::test]
async fn friend_ops_on_missing_profile_error() {
  let s = store().await;
  let err = s
    .add_friend(Uuid::new_v4(), Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ProfileNotFound(_)));
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn subscription_delivers_initial_snapshot_immediately() {
  let s = store().await;
  seed_reviews(&s, 3).await;

  let mut sub = s.subscribe().await.unwrap();
  let snapshot = sub.next_snapshot().await.unwrap();
  assert_eq!(snapshot.len(), 3);
}

#[tokio::test]
async fn subscription_pushes_snapshot_after_write() {
  let s = store().await;
  let mut sub = s.subscribe().await.unwrap();
  assert!(sub.next_snapshot().await.unwrap().is_empty());

  let created = s
    .create_review(new_review(Uuid::new_v4(), "p1", 4.0))
    .await
    .unwrap();

  let snapshot = sub.next_snapshot().await.unwrap();
  assert_eq!(snapshot.len(), 1);
  assert_eq!(snapshot[0].review_id, created.review_id);
}

#[tokio::test]
async fn subscription_sees_deletes() {
  let s = store().await;
  let ids = seed_reviews(&s, 2).await;

  let mut sub = s.subscribe().await.unwrap();
  assert_eq!(sub.next_snapshot().await.unwrap().len(), 2);

  s.delete_review(ids[0]).await.unwrap();
  let snapshot = sub.next_snapshot().await.unwrap();
  assert_eq!(snapshot.len(), 1);
  assert_eq!(snapshot[0].review_id, ids[1]);
}
