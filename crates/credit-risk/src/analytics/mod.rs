//! Population analytics under adjustable approval thresholds.
//!
//! Every aggregate here follows one rule: a record is approved when its
//! normalized score is greater than or equal to the threshold. Rejected
//! defaulters are the positive class of the confusion matrix.

pub mod cache;
pub mod curve;
pub mod metrics;
pub mod optimizer;
pub mod population;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use cache::{CacheKey, ResultCache};
pub use curve::{RocCurve, RocPoint, SensitivityReport, SensitivityRow};
pub use metrics::{ConfusionCell, ConfusionReport, MetricsSnapshot};
pub use optimizer::{Objective, ObjectivePoint, OptimizationResult};
pub use population::{
    normalize_score, PopulationError, PopulationRecord, PopulationStatus, PopulationTable,
    ScoreBucket, ScoreDistribution, SCORE_MAX, SCORE_MIN,
};
pub use router::analytics_router;
pub use service::{AnalyticsCaches, AnalyticsService};

use serde::Serialize;

/// Normalized-score cutoff, validated to lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    pub const DEFAULT: f64 = 0.5;

    pub fn new(value: f64) -> Result<Self, ThresholdError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ThresholdError::OutOfRange(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("threshold must be within [0, 1], got {0}")]
    OutOfRange(f64),
}

/// `count` evenly spaced values from `start` to `stop`, both included.
pub(crate) fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
            values[count - 1] = stop;
            values
        }
    }
}
