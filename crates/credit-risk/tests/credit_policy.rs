//! Integration scenarios for live single-customer scoring.

use credit_risk::scoring::{
    assess, classify, CreditDecision, Probability, RiskClassifier, RiskTier, TierAction,
    TierColor,
};

struct LogisticStub {
    intercept: f64,
    weight: f64,
}

impl RiskClassifier for LogisticStub {
    fn predict_default(&self, features: &[f64]) -> f64 {
        let z = self.intercept + self.weight * features.iter().sum::<f64>();
        1.0 / (1.0 + (-z).exp())
    }
}

fn probability(value: f64) -> Probability {
    Probability::new(value).expect("valid probability")
}

#[test]
fn review_band_maps_to_restricted_tier() {
    let assessment = classify(probability(0.25));

    assert_eq!(assessment.decision, CreditDecision::Review);
    assert_eq!(assessment.decision_label, "Review");
    assert_eq!(assessment.prediction, 0);
    assert_eq!(assessment.risk_score, 25.0);
    assert_eq!(assessment.confidence, 0.65);
    assert_eq!(assessment.tier.tier, RiskTier::D);
    assert_eq!(assessment.tier.color, TierColor::Orange);
    assert_eq!(assessment.tier.action, TierAction::ReviewWithRestrictions);
    assert_eq!(assessment.tier.provision_pct, 10.0);
}

#[test]
fn model_prediction_flips_at_one_half() {
    let below = classify(probability(0.4999));
    let at = classify(probability(0.5));

    assert_eq!(below.prediction, 0);
    assert_eq!(at.prediction, 1);
    assert_eq!(at.decision, CreditDecision::Deny);
    assert_eq!(at.tier.tier, RiskTier::E);
    assert_eq!(at.confidence, 0.675);
}

#[test]
fn high_probabilities_are_denied_with_capped_confidence() {
    let assessment = classify(probability(0.8));

    assert_eq!(assessment.decision, CreditDecision::Deny);
    assert_eq!(assessment.tier.tier, RiskTier::G);
    assert_eq!(assessment.tier.provision_pct, 70.0);
    assert_eq!(assessment.confidence, 1.0);
}

#[test]
fn classifier_output_flows_through_the_policy() {
    let model = LogisticStub {
        intercept: -4.0,
        weight: 1.0,
    };

    let safe = assess(&model, &[0.5, 0.5]).expect("in range");
    let risky = assess(&model, &[3.0, 2.5]).expect("in range");

    assert_eq!(safe.decision, CreditDecision::Approve);
    assert_eq!(risky.decision, CreditDecision::Deny);
    assert!(safe.tier.tier < risky.tier.tier);
}

#[test]
fn assessment_serializes_for_the_api() {
    let payload = serde_json::to_value(classify(probability(0.02))).expect("serializes");

    assert_eq!(payload["decision"], "approve");
    assert_eq!(payload["decision_label"], "Approve");
    assert_eq!(payload["tier"]["code"], "B");
    assert_eq!(payload["tier"]["color"], "green");
    assert_eq!(payload["tier"]["action"], "approve");
}
