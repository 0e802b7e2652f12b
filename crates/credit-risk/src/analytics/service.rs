use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::cache::{CacheKey, ResultCache};
use super::curve::{roc_curve, sensitivity_grid, RocCurve, SensitivityReport, SensitivityRow};
use super::metrics::{compute_confusion, compute_snapshot, ConfusionReport, MetricsSnapshot};
use super::optimizer::{optimize, Objective, OptimizationResult};
use super::population::{PopulationTable, ScoreDistribution};
use super::Threshold;
use crate::config::AnalyticsConfig;

/// Result caches injected into [`AnalyticsService`].
///
/// Per-threshold aggregates use the short lifetime; whole-page results (ROC
/// curve, score distribution) use the long one.
pub struct AnalyticsCaches {
    metrics: ResultCache<MetricsSnapshot>,
    confusion: ResultCache<ConfusionReport>,
    sensitivity: ResultCache<SensitivityReport>,
    roc: ResultCache<RocCurve>,
    distribution: ResultCache<ScoreDistribution>,
}

impl AnalyticsCaches {
    pub fn with_ttls(aggregate_ttl: Duration, page_ttl: Duration) -> Self {
        Self {
            metrics: ResultCache::new(aggregate_ttl),
            confusion: ResultCache::new(aggregate_ttl),
            sensitivity: ResultCache::new(aggregate_ttl),
            roc: ResultCache::new(page_ttl),
            distribution: ResultCache::new(page_ttl),
        }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::with_ttls(config.metrics_ttl, config.curve_ttl)
    }

    fn clear(&self) {
        self.metrics.clear();
        self.confusion.clear();
        self.sensitivity.clear();
        self.roc.clear();
        self.distribution.clear();
    }

    fn purge_expired(&self) -> usize {
        self.metrics.purge_expired()
            + self.confusion.purge_expired()
            + self.sensitivity.purge_expired()
            + self.roc.purge_expired()
            + self.distribution.purge_expired()
    }

    fn len(&self) -> usize {
        self.metrics.len()
            + self.confusion.len()
            + self.sensitivity.len()
            + self.roc.len()
            + self.distribution.len()
    }
}

impl Default for AnalyticsCaches {
    fn default() -> Self {
        Self::from_config(&AnalyticsConfig::default())
    }
}

/// Operations the HTTP layer calls. All results are pure functions of the
/// shared population, so cached values are never invalidated by writes.
pub struct AnalyticsService {
    population: Arc<PopulationTable>,
    caches: AnalyticsCaches,
}

impl AnalyticsService {
    pub fn new(population: Arc<PopulationTable>, caches: AnalyticsCaches) -> Self {
        Self { population, caches }
    }

    pub fn population(&self) -> &PopulationTable {
        &self.population
    }

    /// Number of entries currently held across all caches.
    pub fn cached_entries(&self) -> usize {
        self.caches.len()
    }

    pub fn get_metrics(&self, threshold: Threshold) -> MetricsSnapshot {
        self.metrics_at(threshold.value())
    }

    fn metrics_at(&self, threshold: f64) -> MetricsSnapshot {
        if !self.population.is_available() {
            return MetricsSnapshot::unavailable(threshold);
        }

        let key = CacheKey::new("metrics", &[("threshold", threshold)]);
        if let Some(cached) = self.caches.metrics.get(&key) {
            debug!(key = %key, "metrics cache hit");
            return cached;
        }

        let snapshot = compute_snapshot(&self.population, threshold);
        self.caches.metrics.insert(key, snapshot.clone());
        snapshot
    }

    pub fn get_confusion_matrix(&self, threshold: Threshold) -> ConfusionReport {
        let threshold = threshold.value();
        if !self.population.is_available() {
            return ConfusionReport::unavailable(threshold);
        }

        let key = CacheKey::new("confusion_matrix", &[("threshold", threshold)]);
        self.caches
            .confusion
            .get_or_insert_with(key, || compute_confusion(&self.population, threshold))
    }

    pub fn get_roc_curve(&self) -> RocCurve {
        if !self.population.is_available() {
            return RocCurve::empty();
        }

        let key = CacheKey::new("roc_curve", &[]);
        self.caches.roc.get_or_insert_with(key, || {
            let curve = roc_curve(&self.population);
            info!(auc = curve.auc, points = curve.thresholds.len(), "roc curve computed");
            curve
        })
    }

    pub fn get_threshold_sensitivity(&self) -> SensitivityReport {
        if !self.population.is_available() {
            return SensitivityReport { data: Vec::new() };
        }

        let key = CacheKey::new("threshold_sensitivity", &[]);
        self.caches.sensitivity.get_or_insert_with(key, || {
            let data = sensitivity_grid()
                .into_iter()
                .map(|threshold| {
                    SensitivityRow::from_snapshot(threshold, &self.metrics_at(threshold))
                })
                .collect();
            SensitivityReport { data }
        })
    }

    /// Unknown objective names fall back to profit; the result reports the
    /// objective that was actually used.
    pub fn optimize_threshold(&self, objective: &str) -> OptimizationResult {
        let resolved = Objective::resolve(objective);
        if Objective::parse(objective).is_none() {
            debug!(
                requested = objective,
                resolved = resolved.name(),
                "unknown objective, using default"
            );
        }

        if !self.population.is_available() {
            return OptimizationResult::unavailable(resolved);
        }

        let result = optimize(resolved, &sensitivity_grid(), |threshold| {
            self.metrics_at(threshold)
        });
        info!(
            objective = resolved.name(),
            optimal_threshold = result.optimal_threshold,
            best_value = result.best_value,
            "threshold optimized"
        );
        result
    }

    pub fn get_score_distribution(&self) -> ScoreDistribution {
        if !self.population.is_available() {
            return ScoreDistribution {
                score_distribution: Vec::new(),
            };
        }

        let key = CacheKey::new("score_distribution", &[]);
        self.caches
            .distribution
            .get_or_insert_with(key, || self.population.score_distribution())
    }

    pub fn clear_cache(&self) {
        self.caches.clear();
        info!("analytics caches cleared");
    }

    /// Bounds memory over long uptimes; expiry is otherwise lazy.
    pub fn purge_expired(&self) -> usize {
        self.caches.purge_expired()
    }
}
