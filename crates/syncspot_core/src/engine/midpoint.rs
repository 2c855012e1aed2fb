//! Midpoint aggregation over submitted places.
//!
//! # Invariants
//! - Sums run in entry order so identical input gives bit-identical output.
//! - `nearest` ties resolve to the earliest entry.

use crate::model::result::{Leg, MidpointMethod, MidpointOutcome};
use crate::model::submission::{Coordinate, Place};

/// Mean Earth radius in kilometres (IUGG).
const EARTH_RADIUS_KM: f64 = 6371.0088;
const DEGENERATE_NORM: f64 = 1e-12;

/// Computes the midpoint of `places`. Returns `None` for empty input.
pub fn midpoint(places: &[(&str, &Place)], method: MidpointMethod) -> Option<MidpointOutcome> {
    if places.is_empty() {
        return None;
    }

    let coordinates: Vec<Coordinate> = places.iter().map(|(_, place)| place.coordinate).collect();
    let coordinate = match method {
        MidpointMethod::Planar => planar_mean(&coordinates),
        MidpointMethod::Geodesic => {
            geodesic_mean(&coordinates).unwrap_or_else(|| planar_mean(&coordinates))
        }
    };

    let legs: Vec<Leg> = places
        .iter()
        .map(|(name, place)| Leg {
            name: (*name).to_string(),
            distance_km: haversine_km(place.coordinate, coordinate),
        })
        .collect();

    let mut nearest_index = 0;
    for (index, leg) in legs.iter().enumerate().skip(1) {
        if leg.distance_km < legs[nearest_index].distance_km {
            nearest_index = index;
        }
    }

    Some(MidpointOutcome {
        coordinate,
        method,
        nearest: places[nearest_index].1.clone(),
        legs,
    })
}

/// Great-circle distance between two coordinates.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Arithmetic mean with longitudes unwrapped around the first point, so
/// places on both sides of the antimeridian average across it.
fn planar_mean(coordinates: &[Coordinate]) -> Coordinate {
    let count = coordinates.len() as f64;
    let reference = coordinates.first().map_or(0.0, |point| point.lng);
    let (lat_sum, lng_sum) = coordinates.iter().fold((0.0, 0.0), |(lat, lng), point| {
        (lat + point.lat, lng + unwrap_lng(point.lng, reference))
    });
    Coordinate::new(lat_sum / count, normalize_lng(lng_sum / count))
}

fn unwrap_lng(lng: f64, reference: f64) -> f64 {
    let delta = lng - reference;
    if delta > 180.0 {
        lng - 360.0
    } else if delta < -180.0 {
        lng + 360.0
    } else {
        lng
    }
}

/// Maps any longitude into `[-180, 180)`.
fn normalize_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

fn geodesic_mean(coordinates: &[Coordinate]) -> Option<Coordinate> {
    let count = coordinates.len() as f64;
    let (x, y, z) = coordinates.iter().fold((0.0, 0.0, 0.0), |(x, y, z), point| {
        let lat = point.lat.to_radians();
        let lng = point.lng.to_radians();
        (
            x + lat.cos() * lng.cos(),
            y + lat.cos() * lng.sin(),
            z + lat.sin(),
        )
    });
    let (x, y, z) = (x / count, y / count, z / count);

    // Antipodal inputs cancel out and leave no direction.
    if (x * x + y * y + z * z).sqrt() < DEGENERATE_NORM {
        return None;
    }

    let lng = y.atan2(x);
    let lat = z.atan2((x * x + y * y).sqrt());
    Some(Coordinate::new(lat.to_degrees(), lng.to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::{haversine_km, midpoint};
    use crate::model::result::MidpointMethod;
    use crate::model::submission::{Coordinate, Place};

    fn place(address: &str, lat: f64, lng: f64) -> Place {
        Place::new(address, Coordinate::new(lat, lng))
    }

    #[test]
    fn planar_midpoint_of_two_points_is_their_mean() {
        let a = place("a", 0.0, 0.0);
        let b = place("b", 0.0, 2.0);
        let outcome = midpoint(&[("A", &a), ("B", &b)], MidpointMethod::Planar).unwrap();
        assert_eq!(outcome.coordinate, Coordinate::new(0.0, 1.0));
        assert_eq!(outcome.legs.len(), 2);
        assert_eq!(outcome.nearest.road_name_address, "a");
    }

    #[test]
    fn planar_midpoint_crosses_the_antimeridian() {
        let east = place("east", 0.0, 179.0);
        let west = place("west", 0.0, -179.0);
        let outcome = midpoint(&[("E", &east), ("W", &west)], MidpointMethod::Planar).unwrap();

        assert!(outcome.coordinate.lat.abs() < 1e-9);
        assert!((outcome.coordinate.lng.abs() - 180.0).abs() < 1e-9);
        for leg in &outcome.legs {
            assert!(leg.distance_km < 112.0, "leg too long: {}", leg.distance_km);
        }
    }

    #[test]
    fn planar_midpoint_stays_in_longitude_range() {
        let a = place("a", 10.0, 170.0);
        let b = place("b", 20.0, -160.0);
        let outcome = midpoint(&[("A", &a), ("B", &b)], MidpointMethod::Planar).unwrap();

        assert!((outcome.coordinate.lat - 15.0).abs() < 1e-9);
        assert!((outcome.coordinate.lng + 175.0).abs() < 1e-9);
    }

    #[test]
    fn geodesic_midpoint_matches_planar_on_the_equator() {
        let a = place("a", 0.0, 0.0);
        let b = place("b", 0.0, 2.0);
        let outcome = midpoint(&[("A", &a), ("B", &b)], MidpointMethod::Geodesic).unwrap();
        assert!(outcome.coordinate.lat.abs() < 1e-9);
        assert!((outcome.coordinate.lng - 1.0).abs() < 1e-9);
    }

    #[test]
    fn geodesic_falls_back_to_planar_for_antipodes() {
        let a = place("a", 0.0, 0.0);
        let b = place("b", 0.0, 180.0);
        let outcome = midpoint(&[("A", &a), ("B", &b)], MidpointMethod::Geodesic).unwrap();
        assert_eq!(outcome.coordinate, Coordinate::new(0.0, 90.0));
    }

    #[test]
    fn nearest_place_is_reported() {
        let a = place("far", 37.0, 126.0);
        let b = place("near", 37.5, 127.0);
        let c = place("other", 38.0, 128.1);
        let outcome =
            midpoint(&[("A", &a), ("B", &b), ("C", &c)], MidpointMethod::Planar).unwrap();
        assert_eq!(outcome.nearest.road_name_address, "near");
    }

    #[test]
    fn empty_input_has_no_midpoint() {
        assert!(midpoint(&[], MidpointMethod::Planar).is_none());
    }

    #[test]
    fn haversine_one_degree_on_equator() {
        let km = haversine_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((km - 111.19).abs() < 0.1);
    }
}
