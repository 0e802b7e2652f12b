use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_risk::analytics::{AnalyticsCaches, AnalyticsService, PopulationTable};
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));

    let population = Arc::new(PopulationTable::load_or_unavailable(
        &config.analytics.population_path,
    ));
    let analytics = Arc::new(AnalyticsService::new(
        population,
        AnalyticsCaches::from_config(&config.analytics),
    ));
    spawn_cache_purge(analytics.clone(), config.analytics.metrics_ttl);

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        analytics: analytics.clone(),
    };

    let app = with_operational_routes(analytics)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "credit risk analytics ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Sweeps expired cache entries once per aggregate lifetime.
fn spawn_cache_purge(analytics: Arc<AnalyticsService>, every: Duration) {
    if every.is_zero() {
        return;
    }

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = analytics.purge_expired();
            if removed > 0 {
                debug!(removed, "expired cache entries purged");
            }
        }
    });
}
