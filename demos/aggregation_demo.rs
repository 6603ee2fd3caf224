//! Aggregating condition reports and scoring a path end-to-end.
//!
//! Run with: cargo run --example aggregation_demo

use chrono::{Duration, Utc};
use path_quality::{
    aggregate_status, calc_score, recency_bonus, score_path, GeoPoint, PathScoreInputs, Report,
    ScoreWeights, StreetStatus,
};

fn main() {
    let now = Utc::now();

    // A mix of fresh and aging reports for one street
    let reports = vec![
        report("r-1", StreetStatus::Optimal, 1, now),
        report("r-2", StreetStatus::Optimal, 3, now),
        report("r-3", StreetStatus::Sufficient, 25, now), // half weight
        report("r-4", StreetStatus::RequiresMaintenance, 45, now), // stale, ignored
    ];

    println!("Status Aggregation\n");
    match aggregate_status(&reports, now) {
        Some(status) => println!("Aggregated street status: {status}"),
        None => println!("No usable reports"),
    }

    let created: Vec<_> = reports.iter().map(|r| r.created_at).collect();
    println!("Recency bonus: {:.1}/10\n", recency_bonus(&created, now));

    // Score a two-segment path with that street in optimal condition
    let weights = ScoreWeights::default();
    let inputs = PathScoreInputs {
        reports: reports.clone(),
        fallback_rating: None,
        segment_statuses: vec![Some(StreetStatus::Optimal), Some(StreetStatus::Medium)],
        obstacles: vec![],
        obstacle_cutoff: now - Duration::days(7),
        geometry: vec![
            GeoPoint::new(48.2030, 16.3690),
            GeoPoint::new(48.2080, 16.3810),
            GeoPoint::new(48.2140, 16.3880),
        ],
    };

    println!("Path Scoring\n");
    let snapshot = score_path(&inputs, &weights, now);
    println!("Composite score: {:.1}/100", snapshot.score);
    match snapshot.status {
        Some(status) => println!("Path status: {status}"),
        None => println!("Path status: unknown"),
    }

    // Reference values from the raw formula
    println!("\nFormula reference points:");
    println!("  perfect, no penalties: {}", calc_score(100.0, 100.0, 0, 0.0, &weights));
    println!("  one fresh obstacle:    {}", calc_score(100.0, 100.0, 1, 0.0, &weights));
    println!("  maximum winding:       {}", calc_score(100.0, 100.0, 0, 1.0, &weights));
}

fn report(id: &str, status: StreetStatus, age_days: i64, now: chrono::DateTime<Utc>) -> Report {
    Report {
        id: id.to_string(),
        author_id: "demo".to_string(),
        visit_id: None,
        street_name: Some("Donaukanal".to_string()),
        location: None,
        status,
        rating: Some(4),
        publishable: true,
        created_at: now - Duration::days(age_days),
    }
}
