use super::population::{count, masked_sum, PopulationTable};
use crate::scoring::round_to;
use serde::{Serialize, Serializer};

/// Business aggregates for one approval threshold.
///
/// Rates are percentages kept at full precision; they are rounded to one
/// decimal only when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub threshold: f64,
    pub available: bool,
    pub total_customers: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    #[serde(serialize_with = "one_decimal")]
    pub approval_rate: f64,
    #[serde(serialize_with = "one_decimal")]
    pub default_rate_among_approved: f64,
    pub total_revenue: f64,
    pub default_losses: f64,
    pub net_balance: f64,
    /// Exposure of good customers that were rejected.
    pub missed_opportunity: f64,
    /// Exposure of defaulters that were rejected.
    pub avoided_losses: f64,
    pub average_exposure: f64,
}

impl MetricsSnapshot {
    /// All-zero snapshot reported when no population is loaded.
    pub fn unavailable(threshold: f64) -> Self {
        Self {
            threshold,
            available: false,
            total_customers: 0,
            approved_count: 0,
            rejected_count: 0,
            approval_rate: 0.0,
            default_rate_among_approved: 0.0,
            total_revenue: 0.0,
            default_losses: 0.0,
            net_balance: 0.0,
            missed_opportunity: 0.0,
            avoided_losses: 0.0,
            average_exposure: 0.0,
        }
    }
}

pub(crate) fn one_decimal<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(round_to(*value, 1))
}

fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Single pass of masked aggregation over the population.
pub(crate) fn compute_snapshot(table: &PopulationTable, threshold: f64) -> MetricsSnapshot {
    if !table.is_available() {
        return MetricsSnapshot::unavailable(threshold);
    }

    let total = table.len();
    let defaulted = table.defaulted();
    let exposures = table.exposures();
    let approved = table.approval_mask(threshold);

    let approved_count = count(approved.iter().copied());
    let rejected_count = total - approved_count;

    let approved_defaults = approved
        .iter()
        .zip(defaulted)
        .map(|(approved, defaulted)| *approved && *defaulted);
    let approved_default_count = count(approved_defaults.clone());

    let total_revenue = masked_sum(exposures, approved.iter().copied());
    let default_losses = masked_sum(exposures, approved_defaults);

    let rejected_good = approved
        .iter()
        .zip(defaulted)
        .map(|(approved, defaulted)| !*approved && !*defaulted);
    let rejected_bad = approved
        .iter()
        .zip(defaulted)
        .map(|(approved, defaulted)| !*approved && *defaulted);

    MetricsSnapshot {
        threshold,
        available: true,
        total_customers: total,
        approved_count,
        rejected_count,
        approval_rate: percentage(approved_count, total),
        default_rate_among_approved: percentage(approved_default_count, approved_count),
        total_revenue,
        default_losses,
        net_balance: total_revenue - default_losses,
        missed_opportunity: masked_sum(exposures, rejected_good),
        avoided_losses: masked_sum(exposures, rejected_bad),
        average_exposure: table.average_exposure(),
    }
}

/// Confusion counts where the positive class is "rejected".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionCell {
    /// Defaulters correctly rejected.
    #[serde(rename = "tp")]
    pub true_positives: usize,
    /// Good customers wrongly rejected.
    #[serde(rename = "fp")]
    pub false_positives: usize,
    /// Good customers correctly approved.
    #[serde(rename = "tn")]
    pub true_negatives: usize,
    /// Defaulters wrongly approved.
    #[serde(rename = "fn")]
    pub false_negatives: usize,
}

impl ConfusionCell {
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        }
    }
}

/// Confusion cells plus derived rates, as percentages rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionReport {
    #[serde(flatten)]
    pub cells: ConfusionCell,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub threshold: f64,
    pub available: bool,
}

impl ConfusionReport {
    fn from_cells(cells: ConfusionCell, threshold: f64, available: bool) -> Self {
        Self {
            cells,
            accuracy: round_to(cells.accuracy() * 100.0, 2),
            precision: round_to(cells.precision() * 100.0, 2),
            recall: round_to(cells.recall() * 100.0, 2),
            f1_score: round_to(cells.f1() * 100.0, 2),
            threshold,
            available,
        }
    }

    pub fn unavailable(threshold: f64) -> Self {
        Self::from_cells(ConfusionCell::default(), threshold, false)
    }
}

pub(crate) fn compute_confusion(table: &PopulationTable, threshold: f64) -> ConfusionReport {
    if !table.is_available() {
        return ConfusionReport::unavailable(threshold);
    }

    let mut cells = ConfusionCell::default();
    for (approved, defaulted) in table
        .approval_mask(threshold)
        .into_iter()
        .zip(table.defaulted())
    {
        match (approved, *defaulted) {
            (false, true) => cells.true_positives += 1,
            (false, false) => cells.false_positives += 1,
            (true, false) => cells.true_negatives += 1,
            (true, true) => cells.false_negatives += 1,
        }
    }

    ConfusionReport::from_cells(cells, threshold, true)
}
