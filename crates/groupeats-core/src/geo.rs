//! Great-circle distance helpers for the map/explore views.

use crate::review::{GeoPoint, Review};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
  let d_lat = (b.latitude - a.latitude).to_radians();
  let d_lon = (b.longitude - a.longitude).to_radians();

  let h = (d_lat / 2.0).sin().powi(2)
    + a.latitude.to_radians().cos()
      * b.latitude.to_radians().cos()
      * (d_lon / 2.0).sin().powi(2);

  2.0 * h.sqrt().atan2((1.0 - h).sqrt()) * EARTH_RADIUS_KM
}

/// Retain reviews within `radius_km` of `center`, preserving input order.
pub fn within_radius(reviews: Vec<Review>, center: GeoPoint, radius_km: f64) -> Vec<Review> {
  reviews
    .into_iter()
    .filter(|r| distance_km(center, r.location) <= radius_km)
    .collect()
}
