//! Place summaries — the derived, per-place read model.
//!
//! A [`PlaceSummary`] is never persisted. It is rebuilt from scratch on every
//! aggregation pass over the flat review collection, so it has no identity or
//! lifecycle of its own.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::review::{GeoPoint, Review};

// ─── PlaceSummary ────────────────────────────────────────────────────────────

/// All reviews for one place, with derived statistics.
///
/// Place metadata (name, address, location, tags) is taken from the newest
/// constituent review by `created_at` (review id as tie-break), so divergent
/// metadata across reviews resolves deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceSummary {
  pub place_id:       String,
  pub place_name:     String,
  pub place_address:  String,
  pub place_tags:     Vec<String>,
  pub location:       GeoPoint,

  /// Constituent reviews, in input order.
  pub reviews:        Vec<Review>,

  /// Arithmetic mean of the constituent ratings.
  pub average_rating: f64,
}

impl PlaceSummary {
  pub fn review_count(&self) -> usize {
    self.reviews.len()
  }

  /// Whether at least one constituent review was authored by a member of
  /// `friend_ids`. Derived for presentation; never stored.
  pub fn has_friend_activity(&self, friend_ids: &HashSet<Uuid>) -> bool {
    self.reviews.iter().any(|r| friend_ids.contains(&r.author_id))
  }
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Group a flat review collection into one [`PlaceSummary`] per distinct
/// place id.
///
/// Pure function: a single grouping pass (group order = first-seen order of
/// each place id, reviews kept in input order within a group) followed by a
/// finalise pass computing the mean rating. An empty input yields an empty
/// output; a summary with zero reviews is never produced.
pub fn aggregate_places(reviews: &[Review]) -> Vec<PlaceSummary> {
  let mut groups: Vec<(String, Vec<Review>)> = Vec::new();
  let mut index_of: HashMap<&str, usize> = HashMap::new();

  for review in reviews {
    match index_of.get(review.place_id.as_str()) {
      Some(&i) => groups[i].1.push(review.clone()),
      None => {
        index_of.insert(review.place_id.as_str(), groups.len());
        groups.push((review.place_id.clone(), vec![review.clone()]));
      }
    }
  }

  groups
    .into_iter()
    .filter_map(|(place_id, constituents)| summarize(place_id, constituents))
    .collect()
}

/// Build the summary for one place. Returns `None` for an empty constituent
/// set, which cannot occur for groups built by [`aggregate_places`].
fn summarize(place_id: String, reviews: Vec<Review>) -> Option<PlaceSummary> {
  // Newest review wins for place metadata.
  let newest = reviews
    .iter()
    .max_by_key(|r| (r.created_at, r.review_id))
    .cloned()?;

  let sum: f64 = reviews.iter().map(|r| r.rating).sum();
  let average_rating = sum / reviews.len() as f64;

  Some(PlaceSummary {
    place_id,
    place_name: newest.place_name,
    place_address: newest.place_address,
    place_tags: newest.place_tags,
    location: newest.location,
    reviews,
    average_rating,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{TimeZone, Utc};

  fn review(place: &str, rating: f64, minute: u32) -> Review {
    Review {
      review_id:         Uuid::new_v4(),
      author_id:         Uuid::new_v4(),
      author_name:       "Alice".into(),
      author_avatar_url: String::new(),
      place_id:          place.into(),
      place_name:        format!("{place} name"),
      place_address:     format!("{place} address"),
      place_tags:        vec!["restaurant".into()],
      description:       "tasty".into(),
      rating,
      photo_url:         String::new(),
      location:          GeoPoint { latitude: 52.0, longitude: 13.0 },
      created_at:        Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap(),
      likes:             vec![],
    }
  }

  #[test]
  fn empty_input_yields_empty_output() {
    assert!(aggregate_places(&[]).is_empty());
  }

  #[test]
  fn groups_by_place_in_first_seen_order() {
    let input = vec![review("A", 4.0, 0), review("B", 5.0, 1), review("A", 2.0, 2)];
    let summaries = aggregate_places(&input);

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].place_id, "A");
    assert_eq!(summaries[0].review_count(), 2);
    assert_eq!(summaries[0].average_rating, 3.0);
    assert_eq!(summaries[1].place_id, "B");
    assert_eq!(summaries[1].review_count(), 1);
    assert_eq!(summaries[1].average_rating, 5.0);
  }

  #[test]
  fn union_of_summaries_equals_input() {
    let input = vec![
      review("A", 4.0, 0),
      review("B", 5.0, 1),
      review("A", 2.0, 2),
      review("C", 1.0, 3),
    ];
    let summaries = aggregate_places(&input);

    let mut output_ids: Vec<Uuid> = summaries
      .iter()
      .flat_map(|s| s.reviews.iter().map(|r| r.review_id))
      .collect();
    let mut input_ids: Vec<Uuid> = input.iter().map(|r| r.review_id).collect();
    output_ids.sort();
    input_ids.sort();
    assert_eq!(output_ids, input_ids);
  }

  #[test]
  fn average_matches_mean_within_tolerance() {
    let input = vec![review("A", 1.0, 0), review("A", 2.0, 1), review("A", 5.0, 2)];
    let summaries = aggregate_places(&input);
    assert!((summaries[0].average_rating - (8.0 / 3.0)).abs() < 1e-9);
  }

  #[test]
  fn aggregation_is_idempotent() {
    let input = vec![review("A", 4.0, 0), review("B", 5.0, 1), review("A", 2.0, 2)];
    let first = aggregate_places(&input);
    let second = aggregate_places(&input);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
      assert_eq!(a.place_id, b.place_id);
      assert_eq!(a.average_rating, b.average_rating);
      let ids_a: Vec<Uuid> = a.reviews.iter().map(|r| r.review_id).collect();
      let ids_b: Vec<Uuid> = b.reviews.iter().map(|r| r.review_id).collect();
      assert_eq!(ids_a, ids_b);
    }
  }

  #[test]
  fn newest_review_wins_for_place_metadata() {
    let mut older = review("A", 4.0, 0);
    older.place_name = "Old Name".into();
    let mut newer = review("A", 2.0, 30);
    newer.place_name = "New Name".into();

    // Input order should not matter for the metadata tie-break.
    let summaries = aggregate_places(&[newer.clone(), older.clone()]);
    assert_eq!(summaries[0].place_name, "New Name");

    let summaries = aggregate_places(&[older, newer]);
    assert_eq!(summaries[0].place_name, "New Name");
  }

  #[test]
  fn friend_activity_is_author_set_membership() {
    let friend = Uuid::new_v4();
    let mut a = review("A", 4.0, 0);
    a.author_id = friend;
    let b = review("B", 5.0, 1);

    let summaries = aggregate_places(&[a, b]);
    let friends: HashSet<Uuid> = [friend].into_iter().collect();

    assert!(summaries[0].has_friend_activity(&friends));
    assert!(!summaries[1].has_friend_activity(&friends));
  }
}
