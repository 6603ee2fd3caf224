//! # Route Matching & Ranking
//!
//! Matches a start/end street-name query (optionally with coordinates)
//! against a corpus of known paths, classifies every candidate into a
//! match tier, and ranks the survivors by proximity-penalized score.
//!
//! ## Match tiers
//!
//! Evaluated in strict order, first match wins — a path is never
//! double-classified:
//!
//! 1. **Exact** — both query names found among the path's segment street
//!    names (case-insensitive substring). No penalty.
//! 2. **Partial** — exactly one name matches and the other query point
//!    lies within the nearby threshold of the path's geometry. Penalty on
//!    the unmatched side only.
//! 3. **Nearby** — neither name matches but both query points lie within
//!    the threshold. Penalty on both sides.
//!
//! Tiers 2 and 3 need both query coordinates and a non-empty geometry;
//! without coordinates only tier 1 applies.
//!
//! An empty result list means "no matches" — an expected steady-state,
//! never an error.

use crate::geo_utils::{nearest_distance_km, validate_point};
use crate::{Error, GeoPoint};
use log::{debug, info};
use std::cmp::Ordering;

// ============================================================================
// Types
// ============================================================================

/// How strongly a candidate path satisfied the query. Lower rank wins
/// tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchTier {
    Exact,
    Partial,
    Nearby,
}

impl MatchTier {
    /// Tie-break rank: exact < partial < nearby.
    pub fn rank(self) -> u8 {
        match self {
            MatchTier::Exact => 0,
            MatchTier::Partial => 1,
            MatchTier::Nearby => 2,
        }
    }
}

/// A start/end route request.
///
/// Coordinates are optional; without both of them only exact name matches
/// are considered.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteQuery {
    pub start_name: String,
    pub end_name: String,
    pub start: Option<GeoPoint>,
    pub end: Option<GeoPoint>,
}

impl RouteQuery {
    /// A name-only query.
    pub fn by_names(start_name: &str, end_name: &str) -> Self {
        Self {
            start_name: start_name.to_string(),
            end_name: end_name.to_string(),
            start: None,
            end: None,
        }
    }

    /// A query with literal start/end coordinates.
    pub fn with_points(start_name: &str, end_name: &str, start: GeoPoint, end: GeoPoint) -> Self {
        Self {
            start_name: start_name.to_string(),
            end_name: end_name.to_string(),
            start: Some(start),
            end: Some(end),
        }
    }

    /// Reject out-of-range or NaN coordinates before any scan runs.
    pub fn validate(&self) -> Result<(), Error> {
        for point in [&self.start, &self.end].into_iter().flatten() {
            validate_point(point)?;
        }
        Ok(())
    }
}

/// The read-side view of one corpus path, assembled by the persistence
/// collaborator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathCandidate {
    pub path_id: String,
    pub name: String,
    /// Names of the path's segment streets, in segment order.
    pub street_names: Vec<String>,
    /// Combined polyline of the path; may be empty when geometry is
    /// unknown, which rules out proximity tiers.
    pub geometry: Vec<GeoPoint>,
    /// The path's cached composite score in [0, 100].
    pub score: f64,
}

/// One ranked result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteMatch {
    pub path_id: String,
    pub path_name: String,
    pub tier: MatchTier,
    /// Score reduction in points, 15 per km of average query-point
    /// distance; 0 on exact-matched sides.
    pub proximity_penalty: f64,
    /// `max(0, score - proximity_penalty)` — the ranking key.
    pub adjusted_score: f64,
    /// The candidate's score before the penalty.
    pub original_score: f64,
}

/// Configuration for matching and ranking.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Maximum distance from a query point to a path's geometry for the
    /// proximity tiers. Default: 2.0 km
    pub nearby_threshold_km: f64,

    /// Penalty points per kilometer of average query-point distance.
    /// Default: 15.0
    pub penalty_per_km: f64,

    /// Result list cap. Default: 5
    pub max_results: usize,

    /// Adjusted scores within this window count as tied and fall through
    /// to the tier/penalty tie-break, so floating-point noise cannot let
    /// a nearby match outrank a marginally-lower-scored exact match.
    /// Default: 1.0
    pub tie_window: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            nearby_threshold_km: 2.0,
            penalty_per_km: 15.0,
            max_results: 5,
            tie_window: 1.0,
        }
    }
}

// ============================================================================
// Matching
// ============================================================================

/// Match and rank the corpus against a query.
///
/// Returns the ranked, capped result list; an empty list means no path
/// satisfied any tier. Fails only on invalid query coordinates.
///
/// # Example
///
/// ```rust
/// use path_quality::{GeoPoint, PathCandidate, RouteQuery, SearchConfig, match_routes, MatchTier};
///
/// let corpus = vec![PathCandidate {
///     path_id: "p-1".to_string(),
///     name: "Canal route".to_string(),
///     street_names: vec!["Donaukanal".to_string(), "Praterstern".to_string()],
///     geometry: vec![GeoPoint::new(48.211, 16.383), GeoPoint::new(48.217, 16.392)],
///     score: 72.0,
/// }];
///
/// let query = RouteQuery::by_names("donaukanal", "praterstern");
/// let ranked = match_routes(&query, &corpus, &SearchConfig::default()).unwrap();
/// assert_eq!(ranked[0].tier, MatchTier::Exact);
/// assert_eq!(ranked[0].adjusted_score, 72.0);
/// ```
pub fn match_routes(
    query: &RouteQuery,
    candidates: &[PathCandidate],
    config: &SearchConfig,
) -> Result<Vec<RouteMatch>, Error> {
    query.validate()?;

    let mut matches: Vec<RouteMatch> = candidates
        .iter()
        .filter_map(|c| classify_candidate(query, c, config))
        .collect();

    rank_matches(&mut matches, config);
    matches.truncate(config.max_results);

    info!(
        "match_routes: {} candidates -> {} matches for '{}' / '{}'",
        candidates.len(),
        matches.len(),
        query.start_name,
        query.end_name
    );
    Ok(matches)
}

/// Parallel variant of [`match_routes`] for large corpora.
#[cfg(feature = "parallel")]
pub fn match_routes_parallel(
    query: &RouteQuery,
    candidates: &[PathCandidate],
    config: &SearchConfig,
) -> Result<Vec<RouteMatch>, Error> {
    use rayon::prelude::*;

    query.validate()?;

    let mut matches: Vec<RouteMatch> = candidates
        .par_iter()
        .filter_map(|c| classify_candidate(query, c, config))
        .collect();

    rank_matches(&mut matches, config);
    matches.truncate(config.max_results);

    info!(
        "match_routes_parallel: {} candidates -> {} matches",
        candidates.len(),
        matches.len()
    );
    Ok(matches)
}

/// Penalty in points for a pair of query-point distances:
/// `penalty_per_km * (start + end) / 2`. Exactly linear in the average
/// distance.
#[inline]
pub fn proximity_penalty(start_km: f64, end_km: f64, config: &SearchConfig) -> f64 {
    config.penalty_per_km * (start_km + end_km) / 2.0
}

fn classify_candidate(
    query: &RouteQuery,
    candidate: &PathCandidate,
    config: &SearchConfig,
) -> Option<RouteMatch> {
    let start_named = name_matches(&query.start_name, &candidate.street_names);
    let end_named = name_matches(&query.end_name, &candidate.street_names);

    // Tier 1: both names found, no penalty.
    if start_named && end_named {
        return Some(build_match(candidate, MatchTier::Exact, 0.0));
    }

    // Proximity tiers need both query points and a geometry.
    let (start, end) = match (query.start, query.end) {
        (Some(s), Some(e)) => (s, e),
        _ => return None,
    };
    if candidate.geometry.is_empty() {
        return None;
    }

    let start_dist = nearest_distance_km(&candidate.geometry, &start);
    let end_dist = nearest_distance_km(&candidate.geometry, &end);

    // Tier 2: one name matched; the other side must be close, and only
    // that side is penalized.
    if start_named != end_named {
        let unmatched_dist = if start_named { end_dist } else { start_dist };
        if unmatched_dist <= config.nearby_threshold_km {
            let penalty = proximity_penalty(0.0, unmatched_dist, config);
            return Some(build_match(candidate, MatchTier::Partial, penalty));
        }
        return None;
    }

    // Tier 3: no name matched; both sides must be close and both are
    // penalized.
    if start_dist <= config.nearby_threshold_km && end_dist <= config.nearby_threshold_km {
        let penalty = proximity_penalty(start_dist, end_dist, config);
        return Some(build_match(candidate, MatchTier::Nearby, penalty));
    }

    debug!("candidate {} excluded: no tier satisfied", candidate.path_id);
    None
}

/// Case-insensitive substring check of a query name against the segment
/// street names. Empty query names never match.
fn name_matches(query_name: &str, street_names: &[String]) -> bool {
    let needle = query_name.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    street_names
        .iter()
        .any(|name| name.to_lowercase().contains(&needle))
}

fn build_match(candidate: &PathCandidate, tier: MatchTier, penalty: f64) -> RouteMatch {
    RouteMatch {
        path_id: candidate.path_id.clone(),
        path_name: candidate.name.clone(),
        tier,
        proximity_penalty: penalty,
        adjusted_score: (candidate.score - penalty).max(0.0),
        original_score: candidate.score,
    }
}

/// Sort descending by adjusted score; pairs within the tie window fall
/// through to tier rank, then total penalty ascending.
///
/// The windowed tie-break cannot live inside a single comparator: ties
/// are not transitive across distant scores, and `sort_by` requires a
/// total order. So the sort itself uses only the adjusted score, and the
/// tie-break runs afterwards as bounded adjacent promotion passes —
/// better tier first, then lower penalty within equal tiers. Each swap
/// removes one inversion between a tied pair, so the passes terminate.
/// Tier promotion runs to its fixed point before penalty promotion so
/// that an exact match within the window of a nearby match always ends
/// up above it, even when penalties would order the nearby pair the
/// other way.
fn rank_matches(matches: &mut [RouteMatch], config: &SearchConfig) {
    matches.sort_by(|a, b| {
        b.adjusted_score
            .partial_cmp(&a.adjusted_score)
            .unwrap_or(Ordering::Equal)
    });

    promote_adjacent(matches, config.tie_window, |lower, upper| {
        lower.tier.rank() < upper.tier.rank()
    });
    promote_adjacent(matches, config.tie_window, |lower, upper| {
        lower.tier == upper.tier && lower.proximity_penalty < upper.proximity_penalty
    });
}

/// Repeatedly swap adjacent pairs whose adjusted scores are within the
/// tie window when `better` says the lower entry should rank first.
fn promote_adjacent<F>(matches: &mut [RouteMatch], tie_window: f64, better: F)
where
    F: Fn(&RouteMatch, &RouteMatch) -> bool,
{
    for _ in 0..matches.len() {
        let mut swapped = false;
        for i in 1..matches.len() {
            let tied =
                (matches[i - 1].adjusted_score - matches[i].adjusted_score).abs() <= tie_window;
            if tied && better(&matches[i], &matches[i - 1]) {
                matches.swap(i - 1, i);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
