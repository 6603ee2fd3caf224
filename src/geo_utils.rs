//! # Geographic Utilities
//!
//! Core geographic computation over street and path polylines.
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees).
//! Coordinate validity is checked once at the crate boundary with
//! [`validate_point`]; the computations themselves assume valid input.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`distance_km`] | Great-circle distance between two points |
//! | [`polyline_length_km`] | Total length of a polyline in kilometers |
//! | [`nearest_distance_km`] | Minimum distance from a query point to a polyline's vertices |
//! | [`path_deviation`] | Normalized winding-ness of a polyline, in [0, 1] |
//! | [`validate_point`] | Boundary check for the coordinate validity contract |
//!
//! ## Algorithm Notes
//!
//! The haversine formula calculates the great-circle distance between two
//! points on a sphere with mean Earth radius, accurate to within 0.3% for
//! practical purposes.
//!
//! Reference: [Haversine formula (Wikipedia)](https://en.wikipedia.org/wiki/Haversine_formula)

use crate::{Error, GeoPoint};
use geo::{Distance, Haversine, Point};

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two points using the
/// Haversine formula.
///
/// Returns the distance in kilometers along the Earth's surface (spherical
/// Earth, mean radius). Symmetric, and exactly 0 for identical points.
///
/// # Example
///
/// ```rust
/// use path_quality::{GeoPoint, geo_utils};
///
/// let vienna = GeoPoint::new(48.2082, 16.3738);
/// let graz = GeoPoint::new(47.0707, 15.4395);
///
/// let distance = geo_utils::distance_km(&vienna, &graz);
/// assert!((distance - 145.0).abs() < 5.0); // ~145 km
/// ```
#[inline]
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let p1 = Point::new(a.longitude, a.latitude);
    let p2 = Point::new(b.longitude, b.latitude);
    Haversine::distance(p1, p2) / 1000.0
}

/// Calculate the total length of a polyline in kilometers.
///
/// Sums the haversine distance between consecutive points. Empty or
/// single-point polylines return 0.0.
pub fn polyline_length_km(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| distance_km(&w[0], &w[1]))
        .sum()
}

/// Minimum distance in kilometers from `query` to any vertex of `points`.
///
/// Returns [`f64::INFINITY`] for an empty sequence, so "no geometry" never
/// looks closer than any real candidate.
///
/// # Example
///
/// ```rust
/// use path_quality::{GeoPoint, geo_utils};
///
/// let polyline = vec![
///     GeoPoint::new(48.2082, 16.3738),
///     GeoPoint::new(48.2120, 16.3800),
/// ];
/// let query = GeoPoint::new(48.2082, 16.3738);
///
/// assert_eq!(geo_utils::nearest_distance_km(&polyline, &query), 0.0);
/// assert_eq!(geo_utils::nearest_distance_km(&[], &query), f64::INFINITY);
/// ```
pub fn nearest_distance_km(points: &[GeoPoint], query: &GeoPoint) -> f64 {
    points
        .iter()
        .map(|p| distance_km(p, query))
        .fold(f64::INFINITY, f64::min)
}

// =============================================================================
// Shape Functions
// =============================================================================

/// Normalized path deviation ("winding-ness") of a polyline, in [0, 1].
///
/// `L = 1 - straight / total`, where `straight` is the distance between
/// the first and last point and `total` is the cumulative segment length.
/// A perfectly straight polyline yields 0; the more the path winds, the
/// closer L gets to 1.
///
/// Returns 0 when there is no meaningful winding signal:
/// - fewer than 2 points
/// - zero cumulative length (all points identical)
/// - zero straight-line distance (closed loop)
///
/// The result is clamped to [0, 1] to guard against floating point
/// overshoot.
pub fn path_deviation(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let total = polyline_length_km(points);
    if total == 0.0 {
        return 0.0;
    }

    let straight = distance_km(&points[0], &points[points.len() - 1]);
    if straight == 0.0 {
        return 0.0;
    }

    (1.0 - straight / total).clamp(0.0, 1.0)
}

// =============================================================================
// Boundary Validation
// =============================================================================

/// Reject a point that violates the coordinate validity contract.
///
/// Latitude must be in [-90, 90], longitude in [-180, 180], neither NaN.
/// Called at the crate boundary before coordinates enter any geometry
/// computation.
pub fn validate_point(point: &GeoPoint) -> Result<(), Error> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(Error::InvalidCoordinate {
            latitude: point.latitude,
            longitude: point.longitude,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
