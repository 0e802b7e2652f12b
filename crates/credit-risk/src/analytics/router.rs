use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::curve::{RocCurve, SensitivityReport};
use super::metrics::{ConfusionReport, MetricsSnapshot};
use super::optimizer::OptimizationResult;
use super::population::ScoreDistribution;
use super::service::AnalyticsService;
use super::Threshold;
use crate::error::AppError;
use crate::scoring::{classify, Probability, RiskAssessment};

/// Router exposing the analytics and live classification endpoints.
pub fn analytics_router(service: Arc<AnalyticsService>) -> Router {
    Router::new()
        .route("/api/v1/metrics", get(metrics_handler))
        .route(
            "/api/v1/analysis/confusion_matrix",
            get(confusion_matrix_handler),
        )
        .route("/api/v1/analysis/roc_curve", get(roc_curve_handler))
        .route(
            "/api/v1/analysis/threshold_sensitivity",
            get(threshold_sensitivity_handler),
        )
        .route(
            "/api/v1/analysis/optimize_threshold",
            get(optimize_threshold_handler),
        )
        .route(
            "/api/v1/analysis/score_distribution",
            get(score_distribution_handler),
        )
        .route("/api/v1/analysis/cache/clear", post(clear_cache_handler))
        .route("/api/v1/classify", post(classify_handler))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ThresholdParams {
    #[serde(default)]
    pub(crate) threshold: Option<f64>,
}

impl ThresholdParams {
    fn resolve(&self) -> Result<Threshold, AppError> {
        match self.threshold {
            Some(value) => Ok(Threshold::new(value)?),
            None => Ok(Threshold::default()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ObjectiveParams {
    #[serde(default)]
    pub(crate) objective: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyRequest {
    pub(crate) probability: f64,
}

pub(crate) async fn metrics_handler(
    State(service): State<Arc<AnalyticsService>>,
    Query(params): Query<ThresholdParams>,
) -> Result<Json<MetricsSnapshot>, AppError> {
    let threshold = params.resolve()?;
    Ok(Json(service.get_metrics(threshold)))
}

pub(crate) async fn confusion_matrix_handler(
    State(service): State<Arc<AnalyticsService>>,
    Query(params): Query<ThresholdParams>,
) -> Result<Json<ConfusionReport>, AppError> {
    let threshold = params.resolve()?;
    Ok(Json(service.get_confusion_matrix(threshold)))
}

pub(crate) async fn roc_curve_handler(
    State(service): State<Arc<AnalyticsService>>,
) -> Json<RocCurve> {
    Json(service.get_roc_curve())
}

pub(crate) async fn threshold_sensitivity_handler(
    State(service): State<Arc<AnalyticsService>>,
) -> Json<SensitivityReport> {
    Json(service.get_threshold_sensitivity())
}

pub(crate) async fn optimize_threshold_handler(
    State(service): State<Arc<AnalyticsService>>,
    Query(params): Query<ObjectiveParams>,
) -> Json<OptimizationResult> {
    let objective = params.objective.as_deref().unwrap_or("profit");
    Json(service.optimize_threshold(objective))
}

pub(crate) async fn score_distribution_handler(
    State(service): State<Arc<AnalyticsService>>,
) -> Json<ScoreDistribution> {
    Json(service.get_score_distribution())
}

pub(crate) async fn clear_cache_handler(
    State(service): State<Arc<AnalyticsService>>,
) -> Json<serde_json::Value> {
    service.clear_cache();
    Json(json!({ "status": "cleared" }))
}

pub(crate) async fn classify_handler(
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<RiskAssessment>, AppError> {
    let probability = Probability::new(request.probability)?;
    Ok(Json(classify(probability)))
}
