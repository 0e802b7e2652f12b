use serde::{Deserialize, Serialize};

/// Highest default probability that is approved outright.
pub const APPROVE_CEILING: f64 = 0.10;
/// Highest default probability that is routed to manual review.
pub const REVIEW_CEILING: f64 = 0.30;

/// Recommendation returned to the live scoring caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditDecision {
    Approve,
    Review,
    Deny,
}

impl CreditDecision {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approve => "Approve",
            Self::Review => "Review",
            Self::Deny => "Deny",
        }
    }
}

/// Three-band policy; each band is inclusive on its upper bound.
pub fn decide(probability: f64) -> CreditDecision {
    if probability <= APPROVE_CEILING {
        CreditDecision::Approve
    } else if probability <= REVIEW_CEILING {
        CreditDecision::Review
    } else {
        CreditDecision::Deny
    }
}

/// Confidence grows as the probability leaves the ambiguous middle band.
pub fn confidence(probability: f64) -> f64 {
    let confidence = if probability < 0.20 {
        0.80 + (0.20 - probability)
    } else if probability > 0.50 {
        0.80 + (probability - 0.50)
    } else {
        0.60 + (probability - 0.35).abs() * 0.5
    };

    confidence.min(1.0)
}
