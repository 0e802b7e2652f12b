use super::metrics::MetricsSnapshot;
use crate::scoring::round_to;
use serde::Serialize;

/// Weight applied to the default rate by [`Objective::Balanced`].
pub const BALANCED_DEFAULT_PENALTY: f64 = 10.0;

/// Closed set of optimization goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Maximize net balance.
    Profit,
    /// Minimize the default rate among approved customers.
    Risk,
    /// Approval rate minus ten times the default rate.
    Balanced,
}

const OBJECTIVES: [(&str, Objective); 3] = [
    ("profit", Objective::Profit),
    ("risk", Objective::Risk),
    ("balanced", Objective::Balanced),
];

impl Objective {
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        OBJECTIVES
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, objective)| *objective)
    }

    /// Unknown names fall back to [`Objective::Profit`].
    pub fn resolve(name: &str) -> Self {
        Self::parse(name).unwrap_or(Objective::Profit)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Profit => "profit",
            Self::Risk => "risk",
            Self::Balanced => "balanced",
        }
    }

    pub fn score(self, metrics: &MetricsSnapshot) -> f64 {
        match self {
            Self::Profit => metrics.net_balance,
            Self::Risk => -metrics.default_rate_among_approved,
            Self::Balanced => {
                metrics.approval_rate
                    - metrics.default_rate_among_approved * BALANCED_DEFAULT_PENALTY
            }
        }
    }
}

/// Objective value at one grid threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectivePoint {
    pub threshold: f64,
    pub value: f64,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub optimal_threshold: f64,
    pub objective: Objective,
    pub best_value: f64,
    pub metrics: MetricsSnapshot,
    pub all_results: Vec<ObjectivePoint>,
}

impl OptimizationResult {
    pub(crate) fn unavailable(objective: Objective) -> Self {
        Self {
            optimal_threshold: FALLBACK_THRESHOLD,
            objective,
            best_value: 0.0,
            metrics: MetricsSnapshot::unavailable(FALLBACK_THRESHOLD),
            all_results: Vec::new(),
        }
    }
}

const FALLBACK_THRESHOLD: f64 = 0.5;

/// Scans `grid` in order and keeps the first threshold with the highest
/// objective value.
pub(crate) fn optimize<F>(objective: Objective, grid: &[f64], mut evaluate: F) -> OptimizationResult
where
    F: FnMut(f64) -> MetricsSnapshot,
{
    let mut best_threshold = FALLBACK_THRESHOLD;
    let mut best_value = f64::NEG_INFINITY;
    let mut all_results = Vec::with_capacity(grid.len());

    for threshold in grid {
        let metrics = evaluate(*threshold);
        let value = objective.score(&metrics);

        if value > best_value {
            best_value = value;
            best_threshold = *threshold;
        }

        all_results.push(ObjectivePoint {
            threshold: round_to(*threshold, 2),
            value,
            metrics,
        });
    }

    if all_results.is_empty() {
        return OptimizationResult::unavailable(objective);
    }

    OptimizationResult {
        optimal_threshold: round_to(best_threshold, 2),
        objective,
        best_value,
        metrics: evaluate(best_threshold),
        all_results,
    }
}
