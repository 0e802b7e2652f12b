use std::sync::Arc;
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::analytics::{
    AnalyticsCaches, AnalyticsService, PopulationRecord, PopulationTable, Threshold,
};

/// Population from the reference walkthrough: scores 0.2/0.5/0.7/0.9 with
/// defaults at the lowest and highest score.
pub(super) fn walkthrough_population() -> PopulationTable {
    PopulationTable::from_records(vec![
        PopulationRecord::with_normalized_score(0.2, true, 100.0),
        PopulationRecord::with_normalized_score(0.5, false, 200.0),
        PopulationRecord::with_normalized_score(0.7, false, 300.0),
        PopulationRecord::with_normalized_score(0.9, true, 400.0),
    ])
}

/// Defaulters concentrated at low scores; the default rate among approved
/// customers falls as the threshold rises.
pub(super) fn ordered_population() -> PopulationTable {
    let mut records = Vec::new();
    for step in 0..100 {
        let score = f64::from(step) / 100.0 + 0.005;
        // one in two defaults below 0.3, one in five below 0.6, none above
        let defaulted = match step {
            0..=29 => step % 2 == 0,
            30..=59 => step % 5 == 0,
            _ => false,
        };
        records.push(PopulationRecord::with_normalized_score(
            score,
            defaulted,
            1_000.0 + f64::from(step) * 10.0,
        ));
    }
    PopulationTable::from_records(records)
}

/// Every defaulter scores below every good customer.
pub(super) fn separable_population() -> PopulationTable {
    let defaulters = (0..20).map(|i| {
        PopulationRecord::with_normalized_score(0.05 + f64::from(i) * 0.01, true, 500.0)
    });
    let good = (0..20).map(|i| {
        PopulationRecord::with_normalized_score(0.6 + f64::from(i) * 0.01, false, 500.0)
    });
    PopulationTable::from_records(defaulters.chain(good))
}

/// Each score carries exactly one defaulter and one good customer.
pub(super) fn uncorrelated_population() -> PopulationTable {
    let records = (0..40).flat_map(|i| {
        let score = 0.01 + f64::from(i) * 0.024;
        [
            PopulationRecord::with_normalized_score(score, true, 250.0),
            PopulationRecord::with_normalized_score(score, false, 250.0),
        ]
    });
    PopulationTable::from_records(records)
}

pub(super) fn service_for(population: PopulationTable) -> AnalyticsService {
    AnalyticsService::new(
        Arc::new(population),
        AnalyticsCaches::with_ttls(Duration::from_secs(300), Duration::from_secs(3600)),
    )
}

pub(super) fn threshold(value: f64) -> Threshold {
    Threshold::new(value).expect("valid threshold")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
