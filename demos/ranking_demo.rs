//! Basic example of matching a route query against a path corpus.
//!
//! Run with: cargo run --example ranking_demo

use path_quality::{match_routes, GeoPoint, MatchTier, PathCandidate, RouteQuery, SearchConfig};

fn main() {
    // A small corpus of known paths (Vienna area)
    let corpus = vec![
        PathCandidate {
            path_id: "canal".to_string(),
            name: "Canal commute".to_string(),
            street_names: vec!["Donaukanal".to_string(), "Praterstern".to_string()],
            geometry: vec![
                GeoPoint::new(48.2110, 16.3830),
                GeoPoint::new(48.2140, 16.3880),
                GeoPoint::new(48.2170, 16.3920),
            ],
            score: 74.0,
        },
        PathCandidate {
            path_id: "ring".to_string(),
            name: "Ring loop".to_string(),
            street_names: vec!["Ringstrasse".to_string(), "Opernring".to_string()],
            geometry: vec![
                GeoPoint::new(48.2030, 16.3690),
                GeoPoint::new(48.2050, 16.3740),
                GeoPoint::new(48.2080, 16.3770),
            ],
            score: 88.0,
        },
        PathCandidate {
            path_id: "prater".to_string(),
            name: "Prater straight".to_string(),
            street_names: vec!["Hauptallee".to_string()],
            geometry: vec![
                GeoPoint::new(48.2130, 16.3960),
                GeoPoint::new(48.2070, 16.4120),
            ],
            score: 91.0,
        },
    ];

    let config = SearchConfig::default();

    println!("Route Matching Examples\n");
    println!(
        "Config: nearby_threshold={}km, penalty={}pt/km, cap={}\n",
        config.nearby_threshold_km, config.penalty_per_km, config.max_results
    );

    // 1. Name-only query: exact tier only
    println!("1. Name-only query (Donaukanal -> Praterstern):");
    let query = RouteQuery::by_names("Donaukanal", "Praterstern");
    print_matches(&match_routes(&query, &corpus, &config).unwrap());

    // 2. Query with coordinates: proximity tiers join in
    println!("2. One name plus coordinates near the canal:");
    let query = RouteQuery::with_points(
        "Donaukanal",
        "Somewhere new",
        GeoPoint::new(48.2110, 16.3830),
        GeoPoint::new(48.2160, 16.3900),
    );
    print_matches(&match_routes(&query, &corpus, &config).unwrap());

    // 3. No match at all
    println!("3. Unknown streets, no coordinates:");
    let query = RouteQuery::by_names("Nonexistent", "Also nonexistent");
    print_matches(&match_routes(&query, &corpus, &config).unwrap());
}

fn print_matches(matches: &[path_quality::RouteMatch]) {
    if matches.is_empty() {
        println!("   No matches\n");
        return;
    }
    for m in matches {
        println!(
            "   {} [{}] score {:.1} (penalty {:.1}, raw {:.1})",
            m.path_name,
            tier_label(m.tier),
            m.adjusted_score,
            m.proximity_penalty,
            m.original_score
        );
    }
    println!();
}

fn tier_label(tier: MatchTier) -> &'static str {
    match tier {
        MatchTier::Exact => "exact",
        MatchTier::Partial => "partial",
        MatchTier::Nearby => "nearby",
    }
}
