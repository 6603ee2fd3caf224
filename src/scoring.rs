//! # Path Score Calculator
//!
//! Blends user ratings, aggregated street condition, obstacle recency and
//! path-shape deviation into one composite 0–100 score:
//!
//! `score = clamp(0, 100, α·P + β·S − γ·O·100 − δ·L·100)`
//!
//! | Term | Meaning | Weight |
//! |------|---------|--------|
//! | P | average normalized user rating (0–100) | α = 0.1 |
//! | S | average segment condition score (0–100) | β = 0.3 |
//! | O | obstacles since the last score calculation | γ = 0.6 |
//! | L | path deviation in [0, 1] | δ = 0.15 |
//!
//! The weight ordering γ > β > δ > α is deliberate: a single fresh
//! obstacle subtracts 60 points and dominates everything else, condition
//! outweighs shape, and shape outweighs ratings.

use crate::aggregate::status_from_segments;
use crate::geo_utils::path_deviation;
use crate::{GeoPoint, Obstacle, Report, ScoreSnapshot, StreetStatus};
use chrono::{DateTime, Utc};
use log::debug;

/// Neutral fallback for both the rating and condition components when no
/// evidence exists.
pub const NEUTRAL_COMPONENT: f64 = 50.0;

/// Weights of the composite score formula.
///
/// The defaults encode the intended dominance ordering
/// `obstacle > condition > deviation > rating`; callers overriding them
/// should preserve it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreWeights {
    /// α — user rating component.
    pub rating: f64,
    /// β — aggregated street condition component.
    pub condition: f64,
    /// γ — per-obstacle penalty (scaled by 100).
    pub obstacle: f64,
    /// δ — deviation penalty (scaled by 100).
    pub deviation: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            rating: 0.1,
            condition: 0.3,
            obstacle: 0.6,
            deviation: 0.15,
        }
    }
}

/// Everything the score calculation reads for one path.
///
/// Assembled by the persistence collaborator; this crate never queries
/// storage itself.
#[derive(Debug, Clone)]
pub struct PathScoreInputs {
    /// Reports linked to the path's visits.
    pub reports: Vec<Report>,
    /// Original trip rating (1–5), used when no report carries a rating.
    pub fallback_rating: Option<u8>,
    /// Aggregated status of each segment street, unset where unknown.
    pub segment_statuses: Vec<Option<StreetStatus>>,
    /// Obstacles scoped to the path's visits.
    pub obstacles: Vec<Obstacle>,
    /// Last score calculation, or path creation if never scored.
    pub obstacle_cutoff: DateTime<Utc>,
    /// Combined polyline of the path.
    pub geometry: Vec<GeoPoint>,
}

/// Apply the composite formula and clamp to [0, 100].
///
/// Well-defined for arbitrary finite inputs: negative obstacle counts or
/// out-of-range components only ever move the pre-clamp value, never the
/// output range.
///
/// # Example
///
/// ```rust
/// use path_quality::{calc_score, ScoreWeights};
///
/// let w = ScoreWeights::default();
/// assert_eq!(calc_score(100.0, 100.0, 0, 0.0, &w), 40.0);
/// assert_eq!(calc_score(100.0, 100.0, 1, 0.0, &w), 0.0); // obstacle dominates
/// assert_eq!(calc_score(100.0, 100.0, 0, 1.0, &w), 25.0);
/// ```
pub fn calc_score(
    rating: f64,
    condition: f64,
    obstacle_count: i64,
    deviation: f64,
    weights: &ScoreWeights,
) -> f64 {
    let raw = weights.rating * rating + weights.condition * condition
        - weights.obstacle * obstacle_count as f64 * 100.0
        - weights.deviation * deviation * 100.0;
    raw.clamp(0.0, 100.0)
}

/// P component: average normalized rating over publishable reports,
/// falling back to the original trip rating, else neutral 50.
pub fn rating_component(reports: &[Report], fallback_rating: Option<u8>) -> f64 {
    let ratings: Vec<f64> = reports
        .iter()
        .filter(|r| r.publishable)
        .filter_map(|r| r.normalized_rating())
        .collect();

    if !ratings.is_empty() {
        return ratings.iter().sum::<f64>() / ratings.len() as f64;
    }

    match fallback_rating {
        Some(r) if (1..=5).contains(&r) => (r - 1) as f64 / 4.0 * 100.0,
        _ => NEUTRAL_COMPONENT,
    }
}

/// S component: average condition score over segments with a known
/// status, else neutral 50.
pub fn condition_component(segment_statuses: &[Option<StreetStatus>]) -> f64 {
    let scores: Vec<f64> = segment_statuses
        .iter()
        .flatten()
        .map(|s| s.condition_score())
        .collect();

    if scores.is_empty() {
        return NEUTRAL_COMPONENT;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// O component: obstacles created strictly after the cutoff.
pub fn obstacle_count_since(obstacles: &[Obstacle], cutoff: DateTime<Utc>) -> i64 {
    obstacles.iter().filter(|o| o.created_at > cutoff).count() as i64
}

/// Compute the full score snapshot for one path.
///
/// The snapshot's `status` is the segment-averaged condition, computed
/// independently of the numeric score; the two may legitimately disagree
/// (an optimal-condition path can still score low after a fresh obstacle).
pub fn score_path(
    inputs: &PathScoreInputs,
    weights: &ScoreWeights,
    now: DateTime<Utc>,
) -> ScoreSnapshot {
    let rating = rating_component(&inputs.reports, inputs.fallback_rating);
    let condition = condition_component(&inputs.segment_statuses);
    let obstacles = obstacle_count_since(&inputs.obstacles, inputs.obstacle_cutoff);
    let deviation = path_deviation(&inputs.geometry);

    let score = calc_score(rating, condition, obstacles, deviation, weights);
    debug!(
        "score_path: P={:.1} S={:.1} O={} L={:.3} -> {:.1}",
        rating, condition, obstacles, deviation, score
    );

    ScoreSnapshot {
        score,
        status: status_from_segments(inputs.segment_statuses.iter().copied()),
        calculated_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
