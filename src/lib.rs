//! # Path Quality
//!
//! Crowdsourced bicycle-path quality: status aggregation, path scoring and
//! route matching.
//!
//! This library provides:
//! - Freshness-weighted aggregation of user condition reports into a
//!   per-street status
//! - A composite 0–100 path score blending ratings, street condition,
//!   obstacle recency and path-shape deviation
//! - Name + proximity route matching with tiered classification and
//!   penalty-based ranking
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel corpus scans with rayon
//! - **`serde`** - Enable serde derives on public types
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use path_quality::{GeoPoint, PathCandidate, RouteQuery, SearchConfig, match_routes};
//!
//! let corpus = vec![PathCandidate {
//!     path_id: "p-1".to_string(),
//!     name: "River loop".to_string(),
//!     street_names: vec!["Hauptstrasse".to_string(), "Uferweg".to_string()],
//!     geometry: vec![
//!         GeoPoint::new(48.2082, 16.3738),
//!         GeoPoint::new(48.2120, 16.3800),
//!     ],
//!     score: 80.0,
//! }];
//!
//! let query = RouteQuery::by_names("Hauptstrasse", "Uferweg");
//! let matches = match_routes(&query, &corpus, &SearchConfig::default()).unwrap();
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].proximity_penalty, 0.0);
//! ```

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod aggregate;
pub mod engine;
pub mod freshness;
pub mod geo_utils;
pub mod matching;
pub mod scoring;

pub use aggregate::{aggregate_status, status_from_segments};
pub use engine::{recompute_path, refresh_street, QualityStore};
pub use freshness::{age_days, freshness_weight, recency_bonus};
#[cfg(feature = "parallel")]
pub use matching::match_routes_parallel;
pub use matching::{match_routes, MatchTier, PathCandidate, RouteMatch, RouteQuery, SearchConfig};
pub use scoring::{calc_score, score_path, PathScoreInputs, ScoreWeights};

// ============================================================================
// Errors
// ============================================================================

/// Invalid-input rejections raised before any computation proceeds.
///
/// No-data conditions (no reports, empty corpus, no matches) are never
/// errors; they surface as `None` or an empty result list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Latitude/longitude outside the valid range, or NaN.
    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// A status level string that maps to none of the four ordinal levels.
    #[error("unknown status level: {0}")]
    UnknownStatus(String),

    /// Path segment order indices must be contiguous, zero-based and unique.
    #[error("path {path_id}: segment order indices are not contiguous from 0")]
    InvalidSegmentOrder { path_id: String },
}

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude (WGS84 degrees).
///
/// # Example
/// ```
/// use path_quality::GeoPoint;
/// let point = GeoPoint::new(48.2082, 16.3738); // Vienna
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    ///
    /// Latitude must be in [-90, 90], longitude in [-180, 180], neither NaN.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Aggregated condition of a street, ordered worst to best.
///
/// The ordinal scale (1 = worst, 4 = best) backs both aggregation call
/// sites: report-weighted street aggregation and segment-averaged path
/// status. Keeping the mapping on the enum guarantees the two cannot
/// drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StreetStatus {
    RequiresMaintenance,
    Sufficient,
    Medium,
    Optimal,
}

impl StreetStatus {
    /// Integer scale used for weighted averaging: 1 (worst) to 4 (best).
    pub fn ordinal(self) -> u8 {
        match self {
            StreetStatus::RequiresMaintenance => 1,
            StreetStatus::Sufficient => 2,
            StreetStatus::Medium => 3,
            StreetStatus::Optimal => 4,
        }
    }

    /// Inverse of [`ordinal`](Self::ordinal). Returns `None` outside 1..=4.
    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            1 => Some(StreetStatus::RequiresMaintenance),
            2 => Some(StreetStatus::Sufficient),
            3 => Some(StreetStatus::Medium),
            4 => Some(StreetStatus::Optimal),
            _ => None,
        }
    }

    /// Fixed 0–100 contribution of this status to the path score's
    /// condition component.
    pub fn condition_score(self) -> f64 {
        match self {
            StreetStatus::RequiresMaintenance => 20.0,
            StreetStatus::Sufficient => 50.0,
            StreetStatus::Medium => 70.0,
            StreetStatus::Optimal => 100.0,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            StreetStatus::RequiresMaintenance => "requires_maintenance",
            StreetStatus::Sufficient => "sufficient",
            StreetStatus::Medium => "medium",
            StreetStatus::Optimal => "optimal",
        }
    }
}

impl fmt::Display for StreetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreetStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requires_maintenance" => Ok(StreetStatus::RequiresMaintenance),
            "sufficient" => Ok(StreetStatus::Sufficient),
            "medium" => Ok(StreetStatus::Medium),
            "optimal" => Ok(StreetStatus::Optimal),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// A user condition report for a street.
///
/// Reports either attach to a recorded street visit (`visit_id`) or stand
/// alone with a street name and point. A report with `publishable = false`
/// never influences any aggregate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    pub id: String,
    pub author_id: String,
    /// Visit (route occurrence) this report attaches to, if any.
    pub visit_id: Option<String>,
    /// Street name for standalone reports.
    pub street_name: Option<String>,
    /// Report location for standalone reports.
    pub location: Option<GeoPoint>,
    pub status: StreetStatus,
    /// Optional 1–5 user rating.
    pub rating: Option<u8>,
    pub publishable: bool,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// The 1–5 rating normalized to 0–100, if present and in range.
    pub fn normalized_rating(&self) -> Option<f64> {
        match self.rating {
            Some(r) if (1..=5).contains(&r) => Some((r - 1) as f64 / 4.0 * 100.0),
            _ => None,
        }
    }
}

/// Lifecycle state of an obstacle report.
///
/// `Pending` resolves to one of four terminal outcomes. `Corrected` may
/// carry an updated description/location on the obstacle record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ObstacleState {
    Pending,
    Confirmed,
    Rejected,
    Corrected,
    Expired,
}

impl ObstacleState {
    /// All states except `Pending` are terminal.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ObstacleState::Pending)
    }

    /// Whether the state machine permits moving to `next`.
    pub fn can_transition_to(self, next: ObstacleState) -> bool {
        matches!(self, ObstacleState::Pending) && next != ObstacleState::Pending
    }
}

/// A reported obstacle on a street.
///
/// Obstacles enter path scoring only as a count of new arrivals since the
/// path's last score calculation; they are never individually weighted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    pub id: String,
    /// Visit (route occurrence) this obstacle attaches to, if any.
    pub visit_id: Option<String>,
    pub location: GeoPoint,
    /// Obstacle category, e.g. "construction", "glass", "flooding".
    pub kind: String,
    pub state: ObstacleState,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// A named street: the atomic unit of condition reporting.
///
/// `status` is a derived, cached value written by the aggregation engine;
/// it is never authoritative on its own.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Street {
    pub id: String,
    pub name: String,
    /// Ordered polyline of the street.
    pub points: Vec<GeoPoint>,
    pub status: Option<StreetStatus>,
    pub updated_at: DateTime<Utc>,
}

/// One street's position within a path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathSegment {
    pub street_id: String,
    /// Zero-based position of the street within the path.
    pub order: u32,
}

/// An ordered composition of streets forming a rideable route.
///
/// `score`, `status` and `score_calculated_at` are cached snapshots;
/// recomputation is triggered explicitly whenever an underlying street,
/// report or obstacle changes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    pub id: String,
    pub name: String,
    pub segments: Vec<PathSegment>,
    /// Combined polyline over all segments, in segment order.
    pub geometry: Vec<GeoPoint>,
    /// Cached composite score in [0, 100].
    pub score: Option<f64>,
    /// Cached segment-averaged status.
    pub status: Option<StreetStatus>,
    pub score_calculated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Path {
    /// Verify that segment order indices are contiguous, zero-based and
    /// unique.
    pub fn validate_segments(&self) -> Result<(), Error> {
        let mut orders: Vec<u32> = self.segments.iter().map(|s| s.order).collect();
        orders.sort_unstable();
        for (expected, order) in orders.iter().enumerate() {
            if *order != expected as u32 {
                return Err(Error::InvalidSegmentOrder { path_id: self.id.clone() });
            }
        }
        Ok(())
    }

    /// Street IDs sorted by segment order.
    pub fn ordered_street_ids(&self) -> Vec<&str> {
        let mut segments: Vec<&PathSegment> = self.segments.iter().collect();
        segments.sort_by_key(|s| s.order);
        segments.iter().map(|s| s.street_id.as_str()).collect()
    }

    /// The timestamp obstacles are counted from: last score calculation,
    /// or path creation if never scored.
    pub fn obstacle_cutoff(&self) -> DateTime<Utc> {
        self.score_calculated_at.unwrap_or(self.created_at)
    }
}

/// Result of a path score calculation, written back to the path.
///
/// `score` (weighted formula) and `status` (segment-averaged condition)
/// are computed independently and may disagree: status answers "what
/// condition is this path in", score ranks it. Both are kept.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreSnapshot {
    /// Composite score in [0, 100].
    pub score: f64,
    /// Segment-averaged status, if any segment has a known status.
    pub status: Option<StreetStatus>,
    pub calculated_at: DateTime<Utc>,
}

// ============================================================================
// Tests
// ============================================================================
