//! # Aggregation Engine
//!
//! Orchestrates the write path: aggregate a street's reports into a
//! status, persist the updated street, then recompute the score of every
//! path containing that street.
//!
//! Persistence is an injected collaborator behind [`QualityStore`]; this
//! module never talks to storage directly and performs no cross-request
//! coordination. Every operation is a read-then-single-write computation
//! over a fixed snapshot, so redundant or concurrent invocation for the
//! same inputs is safe — required atomicity belongs to the storage
//! layer's transactions.

use crate::aggregate::aggregate_status;
use crate::scoring::{score_path, PathScoreInputs, ScoreWeights};
use crate::{Report, ScoreSnapshot, Street, StreetStatus};
use chrono::{DateTime, Utc};
use log::{debug, info};

/// Read/write seam to the persistence collaborator.
///
/// Implementations decide transaction boundaries; the engine only
/// promises to read before its single write per entity.
pub trait QualityStore {
    /// Load a street entity, or `None` if unknown.
    fn street(&self, street_id: &str) -> Option<Street>;

    /// All reports attached to a street, standalone or via its visits.
    fn reports_for_street(&self, street_id: &str) -> Vec<Report>;

    /// Persist a street carrying its freshly aggregated status (which is
    /// `None` when no usable reports remain).
    fn set_street_status(&mut self, street: &Street);

    /// IDs of every path that has the street as a segment.
    fn paths_containing(&self, street_id: &str) -> Vec<String>;

    /// Assemble the score calculation inputs for a path, or `None` if the
    /// path is unknown.
    fn path_score_inputs(&self, path_id: &str) -> Option<PathScoreInputs>;

    /// Persist a path's score snapshot.
    fn set_path_score(&mut self, path_id: &str, snapshot: &ScoreSnapshot);
}

/// Re-aggregate one street and propagate to every containing path.
///
/// Loads the street, writes it back with the aggregated status (or with
/// status cleared when no usable reports remain), then recomputes each
/// containing path's score against the freshly written street statuses.
/// Returns the new street status; `None` for an unknown street or when
/// no usable reports exist — both no-data conditions, not errors.
pub fn refresh_street<S: QualityStore + ?Sized>(
    store: &mut S,
    street_id: &str,
    weights: &ScoreWeights,
    now: DateTime<Utc>,
) -> Option<StreetStatus> {
    let street = store.street(street_id)?;
    let reports = store.reports_for_street(street_id);
    let status = aggregate_status(&reports, now);
    let updated = Street { status, updated_at: now, ..street };
    store.set_street_status(&updated);

    let path_ids = store.paths_containing(street_id);
    info!(
        "refresh_street {street_id} ({}): status {:?}, propagating to {} paths",
        updated.name,
        status,
        path_ids.len()
    );
    for path_id in path_ids {
        recompute_path(store, &path_id, weights, now);
    }

    status
}

/// Recompute and persist one path's score snapshot.
///
/// Returns `None` when the store knows no such path — a no-data
/// condition, not an error.
pub fn recompute_path<S: QualityStore + ?Sized>(
    store: &mut S,
    path_id: &str,
    weights: &ScoreWeights,
    now: DateTime<Utc>,
) -> Option<ScoreSnapshot> {
    let inputs = store.path_score_inputs(path_id)?;
    let snapshot = score_path(&inputs, weights, now);
    debug!("recompute_path {path_id}: score {:.1}", snapshot.score);
    store.set_path_score(path_id, &snapshot);
    Some(snapshot)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeoPoint, Obstacle, ObstacleState, Report};
    use chrono::Duration;
    use std::collections::HashMap;

    struct PathRecord {
        street_ids: Vec<String>,
        geometry: Vec<GeoPoint>,
        obstacles: Vec<Obstacle>,
        last_scored_at: DateTime<Utc>,
    }

    #[derive(Default)]
    struct MemoryStore {
        streets: HashMap<String, Street>,
        reports: HashMap<String, Vec<Report>>,
        paths: HashMap<String, PathRecord>,
        score_writes: Vec<(String, ScoreSnapshot)>,
        street_writes: usize,
    }

    impl MemoryStore {
        fn add_street(&mut self, id: &str, status: Option<StreetStatus>, now: DateTime<Utc>) {
            self.streets.insert(
                id.to_string(),
                Street {
                    id: id.to_string(),
                    name: format!("Street {id}"),
                    points: vec![GeoPoint::new(48.20, 16.37), GeoPoint::new(48.21, 16.37)],
                    status,
                    updated_at: now - Duration::days(14),
                },
            );
        }

        fn add_path(&mut self, path_id: &str, street_ids: &[&str], now: DateTime<Utc>) {
            self.paths.insert(
                path_id.to_string(),
                PathRecord {
                    street_ids: street_ids.iter().map(|s| s.to_string()).collect(),
                    geometry: vec![GeoPoint::new(48.20, 16.37), GeoPoint::new(48.22, 16.37)],
                    obstacles: vec![],
                    last_scored_at: now - Duration::days(7),
                },
            );
        }
    }

    impl QualityStore for MemoryStore {
        fn street(&self, street_id: &str) -> Option<Street> {
            self.streets.get(street_id).cloned()
        }

        fn reports_for_street(&self, street_id: &str) -> Vec<Report> {
            self.reports.get(street_id).cloned().unwrap_or_default()
        }

        fn set_street_status(&mut self, street: &Street) {
            self.streets.insert(street.id.clone(), street.clone());
            self.street_writes += 1;
        }

        fn paths_containing(&self, street_id: &str) -> Vec<String> {
            let mut ids: Vec<String> = self
                .paths
                .iter()
                .filter(|(_, p)| p.street_ids.iter().any(|s| s == street_id))
                .map(|(id, _)| id.clone())
                .collect();
            ids.sort();
            ids
        }

        fn path_score_inputs(&self, path_id: &str) -> Option<PathScoreInputs> {
            let path = self.paths.get(path_id)?;
            Some(PathScoreInputs {
                reports: vec![],
                fallback_rating: None,
                segment_statuses: path
                    .street_ids
                    .iter()
                    .map(|id| self.streets.get(id).and_then(|s| s.status))
                    .collect(),
                obstacles: path.obstacles.clone(),
                obstacle_cutoff: path.last_scored_at,
                geometry: path.geometry.clone(),
            })
        }

        fn set_path_score(&mut self, path_id: &str, snapshot: &ScoreSnapshot) {
            self.score_writes.push((path_id.to_string(), snapshot.clone()));
        }
    }

    fn fresh_report(street: &str, status: StreetStatus, now: DateTime<Utc>) -> Report {
        Report {
            id: format!("r-{street}"),
            author_id: "u-1".to_string(),
            visit_id: None,
            street_name: Some(street.to_string()),
            location: None,
            status,
            rating: Some(4),
            publishable: true,
            created_at: now - Duration::days(1),
        }
    }

    #[test]
    fn test_refresh_street_writes_entity_and_propagates() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        store.add_street("s-1", None, now);
        store.add_street("s-2", None, now);
        store
            .reports
            .insert("s-1".to_string(), vec![fresh_report("s-1", StreetStatus::Optimal, now)]);
        store.add_path("p-1", &["s-1", "s-2"], now);
        store.add_path("p-2", &["s-1"], now);
        store.add_path("unrelated", &["s-9"], now);

        let status = refresh_street(&mut store, "s-1", &ScoreWeights::default(), now);

        assert_eq!(status, Some(StreetStatus::Optimal));
        // The street entity was written back with status and timestamp
        let street = store.streets.get("s-1").unwrap();
        assert_eq!(street.status, Some(StreetStatus::Optimal));
        assert_eq!(street.updated_at, now);
        assert_eq!(street.name, "Street s-1");
        assert_eq!(store.street_writes, 1);

        // Both containing paths rescored, the unrelated one untouched
        let rescored: Vec<&str> = store.score_writes.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(rescored, vec!["p-1", "p-2"]);

        // The new street status flowed into the path score: S for p-2 is
        // 100 (single optimal segment), so score = 0.1*50 + 0.3*100 = 35
        let (_, snapshot) = &store.score_writes[1];
        assert!((snapshot.score - 35.0).abs() < 0.1);
        assert_eq!(snapshot.status, Some(StreetStatus::Optimal));
        assert_eq!(snapshot.calculated_at, now);
    }

    #[test]
    fn test_refresh_street_clears_status_without_reports() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        store.add_street("s-1", Some(StreetStatus::Medium), now);

        let status = refresh_street(&mut store, "s-1", &ScoreWeights::default(), now);

        assert_eq!(status, None);
        // The stale cached status was overwritten with unset, not left as-is
        assert_eq!(store.streets.get("s-1").unwrap().status, None);
        assert_eq!(store.street_writes, 1);
    }

    #[test]
    fn test_refresh_unknown_street_writes_nothing() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        store.add_path("p-1", &["s-1"], now);

        let status = refresh_street(&mut store, "ghost", &ScoreWeights::default(), now);

        assert_eq!(status, None);
        assert_eq!(store.street_writes, 0);
        assert!(store.score_writes.is_empty());
    }

    #[test]
    fn test_refresh_street_idempotent_for_fixed_snapshot() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        store.add_street("s-1", None, now);
        store
            .reports
            .insert("s-1".to_string(), vec![fresh_report("s-1", StreetStatus::Medium, now)]);
        store.add_path("p-1", &["s-1"], now);

        let first = refresh_street(&mut store, "s-1", &ScoreWeights::default(), now);
        let second = refresh_street(&mut store, "s-1", &ScoreWeights::default(), now);

        assert_eq!(first, second);
        assert_eq!(store.score_writes.len(), 2);
        assert_eq!(store.score_writes[0].1, store.score_writes[1].1);
    }

    #[test]
    fn test_recompute_unknown_path_is_none() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        assert_eq!(recompute_path(&mut store, "ghost", &ScoreWeights::default(), now), None);
        assert!(store.score_writes.is_empty());
    }

    #[test]
    fn test_recompute_counts_only_new_obstacles() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        store.add_street("s-1", None, now);
        store.add_path("p-1", &["s-1"], now);
        let path = store.paths.get_mut("p-1").unwrap();
        // One obstacle before the cutoff, one after
        for age_days in [10, 1] {
            path.obstacles.push(Obstacle {
                id: format!("o-{age_days}"),
                visit_id: None,
                location: GeoPoint::new(48.21, 16.37),
                kind: "construction".to_string(),
                state: ObstacleState::Pending,
                description: None,
                created_at: now - Duration::days(age_days),
                confirmed_at: None,
            });
        }

        let snapshot = recompute_path(&mut store, "p-1", &ScoreWeights::default(), now).unwrap();
        // P=50, S=50, one fresh obstacle: 5 + 15 - 60 -> clamped to 0
        assert_eq!(snapshot.score, 0.0);
    }
}
