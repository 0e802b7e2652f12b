use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use credit_risk::analytics::{analytics_router, AnalyticsService};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) fn with_operational_routes(service: Arc<AnalyticsService>) -> axum::Router {
    analytics_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck(Extension(state): Extension<AppState>) -> Json<serde_json::Value> {
    let population = state.analytics.population();
    Json(json!({
        "status": "ok",
        "population": population.status(),
        "records": population.len(),
        "cached_entries": state.analytics.cached_entries(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Acquire);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use credit_risk::analytics::{AnalyticsCaches, PopulationRecord, PopulationTable};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn state(population: PopulationTable, ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            analytics: Arc::new(AnalyticsService::new(
                Arc::new(population),
                AnalyticsCaches::default(),
            )),
        }
    }

    fn small_population() -> PopulationTable {
        PopulationTable::from_records(vec![
            PopulationRecord::new(420.0, true, 1_000.0),
            PopulationRecord::new(780.0, false, 2_000.0),
        ])
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json")
    }

    #[tokio::test]
    async fn healthcheck_reports_population_state() {
        let Json(body) = healthcheck(Extension(state(small_population(), true))).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["population"], "loaded");
        assert_eq!(body["records"], 2);
        assert!(body["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn healthcheck_flags_missing_population() {
        let Json(body) = healthcheck(Extension(state(PopulationTable::unavailable(), true))).await;

        assert_eq!(body["population"], "unavailable");
        assert_eq!(body["records"], 0);
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let response = readiness_endpoint(Extension(state(small_population(), false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["status"], "initializing");

        let response = readiness_endpoint(Extension(state(small_population(), true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn operational_routes_share_the_analytics_router() {
        let app_state = state(small_population(), true);
        let router =
            with_operational_routes(app_state.analytics.clone()).layer(Extension(app_state));

        let health = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch");
        assert_eq!(health.status(), StatusCode::OK);

        let metrics = router
            .oneshot(
                Request::get("/api/v1/metrics?threshold=0.5")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(metrics.status(), StatusCode::OK);
        let payload = json_body(metrics).await;
        assert_eq!(payload["approved_count"], 1);
        assert_eq!(payload["net_balance"], 2_000.0);
    }
}
