use super::linspace;
use super::metrics::{one_decimal, MetricsSnapshot};
use super::population::PopulationTable;
use crate::scoring::round_to;
use serde::Serialize;

/// Resolution of the ROC sweep over `[0, 1]`.
pub const ROC_GRID_POINTS: usize = 50;
/// Resolution of the sensitivity and optimizer sweep over `[0.1, 0.9]`.
pub const SENSITIVITY_GRID_POINTS: usize = 9;

pub(crate) fn roc_grid() -> Vec<f64> {
    linspace(0.0, 1.0, ROC_GRID_POINTS)
}

pub(crate) fn sensitivity_grid() -> Vec<f64> {
    linspace(0.1, 0.9, SENSITIVITY_GRID_POINTS)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RocPoint {
    pub threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
}

/// ROC data in grid order, shaped for chart rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
    pub auc: f64,
}

impl RocCurve {
    pub fn empty() -> Self {
        Self {
            fpr: Vec::new(),
            tpr: Vec::new(),
            thresholds: Vec::new(),
            auc: 0.0,
        }
    }

    pub fn points(&self) -> Vec<RocPoint> {
        self.thresholds
            .iter()
            .zip(&self.fpr)
            .zip(&self.tpr)
            .map(|((threshold, fpr), tpr)| RocPoint {
                threshold: *threshold,
                fpr: *fpr,
                tpr: *tpr,
            })
            .collect()
    }
}

/// Sweeps the ROC grid treating `normalized_score < t` as rejected.
pub(crate) fn roc_curve(table: &PopulationTable) -> RocCurve {
    if !table.is_available() {
        return RocCurve::empty();
    }

    let scores = table.normalized_scores();
    let defaulted = table.defaulted();
    let total_defaulters = table.default_count();
    let total_good = table.len() - total_defaulters;

    let thresholds = roc_grid();
    let mut fpr = Vec::with_capacity(thresholds.len());
    let mut tpr = Vec::with_capacity(thresholds.len());

    for threshold in &thresholds {
        let (mut tp, mut fp) = (0usize, 0usize);
        for (score, defaulted) in scores.iter().zip(defaulted) {
            if *score < *threshold {
                if *defaulted {
                    tp += 1;
                } else {
                    fp += 1;
                }
            }
        }

        tpr.push(if total_defaulters > 0 {
            tp as f64 / total_defaulters as f64
        } else {
            0.0
        });
        fpr.push(if total_good > 0 {
            fp as f64 / total_good as f64
        } else {
            0.0
        });
    }

    let auc = trapezoidal_auc(&fpr, &tpr);

    RocCurve {
        fpr,
        tpr,
        thresholds,
        auc,
    }
}

/// Area under `(fpr, tpr)` after sorting by fpr, as a non-negative value.
pub(crate) fn trapezoidal_auc(fpr: &[f64], tpr: &[f64]) -> f64 {
    let mut pairs: Vec<(f64, f64)> = fpr.iter().copied().zip(tpr.iter().copied()).collect();
    pairs.sort_by(|left, right| left.0.total_cmp(&right.0));

    let area: f64 = pairs
        .windows(2)
        .map(|pair| (pair[1].0 - pair[0].0) * (pair[0].1 + pair[1].1) / 2.0)
        .sum();

    area.abs()
}

/// Condensed metrics for one point of the sensitivity grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRow {
    pub threshold: f64,
    #[serde(serialize_with = "one_decimal")]
    pub approval_rate: f64,
    #[serde(serialize_with = "one_decimal")]
    pub default_rate_among_approved: f64,
    pub net_balance: f64,
    pub avoided_losses: f64,
    pub missed_opportunity: f64,
}

impl SensitivityRow {
    pub(crate) fn from_snapshot(threshold: f64, snapshot: &MetricsSnapshot) -> Self {
        Self {
            threshold: round_to(threshold, 2),
            approval_rate: snapshot.approval_rate,
            default_rate_among_approved: snapshot.default_rate_among_approved,
            net_balance: snapshot.net_balance,
            avoided_losses: snapshot.avoided_losses,
            missed_opportunity: snapshot.missed_opportunity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityReport {
    pub data: Vec<SensitivityRow>,
}
