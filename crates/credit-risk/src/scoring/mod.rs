//! Live scoring policy: probability to decision, regulatory tier and confidence.

mod classifier;
mod policy;
mod tiers;

pub use classifier::{assess, RiskClassifier};
pub use policy::{confidence, decide, CreditDecision, APPROVE_CEILING, REVIEW_CEILING};
pub use tiers::{RiskTier, TierAction, TierClassification, TierColor};

use serde::Serialize;

/// Cutoff the binary model prediction uses; independent of the decision bands.
pub const MODEL_THRESHOLD: f64 = 0.50;

/// Default probability validated to lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    pub fn new(value: f64) -> Result<Self, ProbabilityError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ProbabilityError::OutOfRange(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbabilityError {
    #[error("probability must be within [0, 1], got {0}")]
    OutOfRange(f64),
}

/// Full outcome of classifying one default probability.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub probability: f64,
    pub prediction: u8,
    pub risk_score: f64,
    pub decision: CreditDecision,
    pub decision_label: &'static str,
    pub confidence: f64,
    pub tier: TierClassification,
}

/// Pure mapping from a probability to the decision, tier and confidence.
pub fn classify(probability: Probability) -> RiskAssessment {
    let p = probability.value();
    let decision = decide(p);

    RiskAssessment {
        probability: round_to(p, 4),
        prediction: u8::from(p >= MODEL_THRESHOLD),
        risk_score: round_to(p * 100.0, 2),
        decision,
        decision_label: decision.label(),
        confidence: round_to(confidence(p), 4),
        tier: RiskTier::from_probability(p).classification(),
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
