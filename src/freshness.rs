//! # Freshness & Recency
//!
//! Pure functions of a timestamp/now delta that decide how much influence
//! a report still has.
//!
//! | Age | Weight |
//! |-----|--------|
//! | < 7 days | 1.0 |
//! | < 14 days | 0.8 |
//! | < 30 days | 0.5 |
//! | >= 30 days | 0.0 (excluded from aggregation) |
//!
//! Boundaries are half-open on the lower side: an age of exactly 0 days
//! still yields 1.0, an age of exactly 7 days drops to 0.8.

use chrono::{DateTime, Utc};

/// Reports at least this old carry zero weight.
pub const FRESHNESS_HORIZON_DAYS: f64 = 30.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Age of a timestamp in fractional days, clamped to be non-negative.
///
/// A clock-skewed "future" timestamp counts as brand new rather than
/// being dropped.
#[inline]
pub fn age_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - created_at).num_milliseconds() as f64 / 1000.0;
    (seconds / SECONDS_PER_DAY).max(0.0)
}

/// Step-function freshness weight of a report, in [0, 1].
///
/// # Example
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use path_quality::freshness_weight;
///
/// let now = Utc::now();
/// assert_eq!(freshness_weight(now - Duration::days(3), now), 1.0);
/// assert_eq!(freshness_weight(now - Duration::days(10), now), 0.8);
/// assert_eq!(freshness_weight(now - Duration::days(21), now), 0.5);
/// assert_eq!(freshness_weight(now - Duration::days(35), now), 0.0);
/// ```
#[inline]
pub fn freshness_weight(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    weight_for_age(age_days(created_at, now))
}

/// Freshness weight for an already-computed age in days.
pub fn weight_for_age(days: f64) -> f64 {
    if days < 7.0 {
        1.0
    } else if days < 14.0 {
        0.8
    } else if days < FRESHNESS_HORIZON_DAYS {
        0.5
    } else {
        0.0
    }
}

/// Auxiliary ranking bonus in [0, 10] for how fresh a set of reports is
/// overall: `max(0, 10 * (1 - average_age / 30))`.
///
/// Answers "how fresh is this evidence" rather than "what does the
/// evidence say", so it stays outside the canonical score formula. An
/// empty set earns no bonus.
pub fn recency_bonus(created_times: &[DateTime<Utc>], now: DateTime<Utc>) -> f64 {
    if created_times.is_empty() {
        return 0.0;
    }

    let total_age: f64 = created_times.iter().map(|t| age_days(*t, now)).sum();
    let average_age = total_age / created_times.len() as f64;

    (10.0 * (1.0 - average_age / FRESHNESS_HORIZON_DAYS)).max(0.0)
}

// =============================================================================
// Unit Tests
// =============================================================================
