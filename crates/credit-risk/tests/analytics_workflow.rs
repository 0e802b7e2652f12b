//! Integration scenarios for population analytics.
//!
//! Scenarios load a population from CSV, then exercise the public service
//! facade and HTTP router the API binary mounts.

mod common {
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    use credit_risk::analytics::{AnalyticsCaches, AnalyticsService, PopulationTable};
    use tempfile::NamedTempFile;

    /// Raw bureau scores with defaults concentrated below 600.
    pub(super) const POPULATION_CSV: &str = "\
score,defaulted,exposure
320,1,1500
410,1,2200
455,0,1800
530,1,2600
575,0,3000
640,0,2500
690,1,4100
735,0,3900
810,0,5200
900,0,6100
";

    pub(super) fn population_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(POPULATION_CSV.as_bytes())
            .expect("write population");
        file
    }

    pub(super) fn loaded_service() -> Arc<AnalyticsService> {
        let file = population_file();
        let population = PopulationTable::from_path(file.path()).expect("population loads");
        Arc::new(AnalyticsService::new(
            Arc::new(population),
            AnalyticsCaches::with_ttls(Duration::from_secs(300), Duration::from_secs(3600)),
        ))
    }
}

mod service {
    use super::common::*;
    use credit_risk::analytics::{
        normalize_score, Objective, PopulationStatus, PopulationTable, Threshold,
    };

    #[test]
    fn csv_population_feeds_threshold_metrics() {
        let service = loaded_service();
        assert_eq!(service.population().status(), PopulationStatus::Loaded);
        assert_eq!(service.population().len(), 10);

        // 640 normalizes to ~0.523, so the top five scores are approved
        let metrics = service.get_metrics(Threshold::new(0.5).expect("valid"));
        assert_eq!(metrics.approved_count, 5);
        assert_eq!(metrics.rejected_count, 5);
        assert_eq!(metrics.total_revenue, 21_800.0);
        assert_eq!(metrics.default_losses, 4_100.0);
        assert_eq!(metrics.net_balance, 17_700.0);
        assert_eq!(metrics.avoided_losses, 6_300.0);
        assert_eq!(metrics.missed_opportunity, 4_800.0);
        assert!((metrics.default_rate_among_approved - 20.0).abs() < 1e-9);
    }

    #[test]
    fn normalized_scores_follow_the_bureau_range() {
        let service = loaded_service();
        let scores = service.population().normalized_scores();

        assert!((scores[0] - normalize_score(320.0)).abs() < 1e-12);
        assert!((normalize_score(300.0)).abs() < 1e-12);
        assert!((normalize_score(950.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn confusion_cells_cover_every_customer() {
        let service = loaded_service();

        for step in 0..=20 {
            let threshold = Threshold::new(f64::from(step) / 20.0).expect("valid");
            let report = service.get_confusion_matrix(threshold);
            assert_eq!(report.cells.total(), 10);
        }
    }

    #[test]
    fn optimizer_and_sensitivity_share_the_same_grid() {
        let service = loaded_service();

        let sensitivity = service.get_threshold_sensitivity();
        let result = service.optimize_threshold("balanced");

        assert_eq!(result.objective, Objective::Balanced);
        let optimizer_grid: Vec<f64> = result
            .all_results
            .iter()
            .map(|point| point.threshold)
            .collect();
        let sensitivity_grid: Vec<f64> =
            sensitivity.data.iter().map(|row| row.threshold).collect();
        assert_eq!(optimizer_grid, sensitivity_grid);
    }

    #[test]
    fn missing_population_file_degrades_to_unavailable() {
        let population = PopulationTable::load_or_unavailable("does/not/exist.csv");

        assert_eq!(population.status(), PopulationStatus::Unavailable);
        assert!(!population.is_available());
    }
}

mod http {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use credit_risk::analytics::analytics_router;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let router = analytics_router(loaded_service());
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json"))
    }

    #[tokio::test]
    async fn get_metrics_returns_rounded_rates() {
        let (status, payload) = get_json("/api/v1/metrics?threshold=0.5").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["approval_rate"], 50.0);
        assert_eq!(payload["default_rate_among_approved"], 20.0);
        assert_eq!(payload["available"], true);
    }

    #[tokio::test]
    async fn get_roc_curve_returns_chart_arrays() {
        let (status, payload) = get_json("/api/v1/analysis/roc_curve").await;

        assert_eq!(status, StatusCode::OK);
        for field in ["fpr", "tpr", "thresholds"] {
            assert_eq!(payload[field].as_array().map(Vec::len), Some(50));
        }
        let auc = payload["auc"].as_f64().expect("auc");
        assert!((0.0..=1.0).contains(&auc));
    }

    #[tokio::test]
    async fn get_score_distribution_counts_each_score() {
        let (status, payload) = get_json("/api/v1/analysis/score_distribution").await;

        assert_eq!(status, StatusCode::OK);
        let buckets = payload["score_distribution"].as_array().expect("buckets");
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[0]["score"], 320);
        assert_eq!(buckets[0]["count"], 1);
    }

    #[tokio::test]
    async fn out_of_range_threshold_is_rejected() {
        let (status, payload) = get_json("/api/v1/analysis/confusion_matrix?threshold=-0.1").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload.get("error").is_some());
    }
}
