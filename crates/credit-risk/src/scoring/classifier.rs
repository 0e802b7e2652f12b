use super::{classify, Probability, ProbabilityError, RiskAssessment};

/// Trained model boundary. Implementations map an encoded feature vector to
/// the probability of default.
pub trait RiskClassifier: Send + Sync {
    fn predict_default(&self, features: &[f64]) -> f64;
}

/// Scores `features` with `classifier` and applies the decision policy.
///
/// A classifier that returns a value outside `[0, 1]` is treated as a
/// contract violation and surfaced as an error instead of being clamped.
pub fn assess<C>(classifier: &C, features: &[f64]) -> Result<RiskAssessment, ProbabilityError>
where
    C: RiskClassifier + ?Sized,
{
    let probability = Probability::new(classifier.predict_default(features))?;
    Ok(classify(probability))
}
