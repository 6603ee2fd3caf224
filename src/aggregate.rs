//! # Status Aggregation
//!
//! Turns a set of condition reports into one aggregated street status, and
//! a set of segment statuses into one path status.
//!
//! Both operations average over the [`StreetStatus`] ordinal scale and
//! round half-up, but they answer different questions and stay separate:
//! [`aggregate_status`] weighs individual reports by freshness, while
//! [`status_from_segments`] takes the plain mean of already-aggregated
//! segment statuses.
//!
//! Aggregation is weighted averaging, not majority voting: a single very
//! recent optimal report can outweigh several stale poor ones when its
//! weighted contribution dominates.

use crate::freshness::freshness_weight;
use crate::{Report, StreetStatus};
use chrono::{DateTime, Utc};
use log::debug;

/// Aggregate publishable, fresh reports into one street status.
///
/// Each report contributes `ordinal * freshness_weight`; reports that are
/// non-publishable or older than the freshness horizon contribute nothing.
/// Returns `None` when the total weight is 0 — the caller must treat the
/// street as having unknown status, never default to a level.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use path_quality::{aggregate_status, Report, StreetStatus};
///
/// let report = Report {
///     id: "r-1".to_string(),
///     author_id: "u-1".to_string(),
///     visit_id: None,
///     street_name: Some("Uferweg".to_string()),
///     location: None,
///     status: StreetStatus::Optimal,
///     rating: Some(5),
///     publishable: true,
///     created_at: Utc::now(),
/// };
///
/// assert_eq!(aggregate_status(&[report], Utc::now()), Some(StreetStatus::Optimal));
/// assert_eq!(aggregate_status(&[], Utc::now()), None);
/// ```
pub fn aggregate_status(reports: &[Report], now: DateTime<Utc>) -> Option<StreetStatus> {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for report in reports {
        if !report.publishable {
            continue;
        }
        let weight = freshness_weight(report.created_at, now);
        if weight == 0.0 {
            continue;
        }
        weighted_sum += report.status.ordinal() as f64 * weight;
        total_weight += weight;
    }

    if total_weight == 0.0 {
        debug!("aggregate_status: no usable reports out of {}", reports.len());
        return None;
    }

    let level = round_to_level(weighted_sum / total_weight);
    debug!(
        "aggregate_status: {} reports, total weight {:.2}, level {}",
        reports.len(),
        total_weight,
        level
    );
    StreetStatus::from_ordinal(level)
}

/// Average the known statuses of a path's segments into one path status.
///
/// Segments with unset status are skipped; returns `None` when no segment
/// has a known status. This is the unweighted variant used for the path's
/// cached status and is independent of the numeric path score.
pub fn status_from_segments<I>(statuses: I) -> Option<StreetStatus>
where
    I: IntoIterator<Item = Option<StreetStatus>>,
{
    let mut sum = 0.0;
    let mut count = 0usize;

    for status in statuses.into_iter().flatten() {
        sum += status.ordinal() as f64;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    StreetStatus::from_ordinal(round_to_level(sum / count as f64))
}

/// Round a mean ordinal to the nearest level, half-up, clamped to 1..=4.
fn round_to_level(mean: f64) -> u8 {
    (mean + 0.5).floor().clamp(1.0, 4.0) as u8
}

// =============================================================================
// Unit Tests
// =============================================================================
