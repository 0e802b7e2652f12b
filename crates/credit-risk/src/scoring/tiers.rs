use serde::{Deserialize, Serialize};

/// Regulatory risk band, ordered from best (`AA`) to worst (`H`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    AA,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

/// Coarse color bucket used by dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierColor {
    Green,
    Yellow,
    Orange,
    Red,
}

/// Action attached to a tier. Finer grained than the three-band decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierAction {
    Approve,
    Review,
    ReviewWithRestrictions,
    Deny,
}

/// Upper-inclusive probability bounds for every tier except the overflow tier.
const TIER_CEILINGS: [(f64, RiskTier); 8] = [
    (0.005, RiskTier::AA),
    (0.01, RiskTier::A),
    (0.03, RiskTier::B),
    (0.10, RiskTier::C),
    (0.30, RiskTier::D),
    (0.50, RiskTier::E),
    (0.70, RiskTier::F),
    (1.00, RiskTier::G),
];

impl RiskTier {
    pub fn ordered() -> [RiskTier; 9] {
        [
            RiskTier::AA,
            RiskTier::A,
            RiskTier::B,
            RiskTier::C,
            RiskTier::D,
            RiskTier::E,
            RiskTier::F,
            RiskTier::G,
            RiskTier::H,
        ]
    }

    pub fn from_probability(probability: f64) -> Self {
        TIER_CEILINGS
            .iter()
            .find(|(ceiling, _)| probability <= *ceiling)
            .map(|(_, tier)| *tier)
            .unwrap_or(RiskTier::H)
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::AA => "AA",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
            Self::H => "H",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AA => "Minimal Risk",
            Self::A => "Low Risk",
            Self::B => "Moderate Risk",
            Self::C => "Medium Risk",
            Self::D => "High Risk",
            Self::E => "Elevated Risk",
            Self::F => "Very Elevated Risk",
            Self::G => "Critical Risk",
            Self::H => "Loss",
        }
    }

    /// Required loan-loss provision, in percent of exposure.
    pub const fn provision_pct(self) -> f64 {
        match self {
            Self::AA => 0.0,
            Self::A => 0.5,
            Self::B => 1.0,
            Self::C => 3.0,
            Self::D => 10.0,
            Self::E => 30.0,
            Self::F => 50.0,
            Self::G => 70.0,
            Self::H => 100.0,
        }
    }

    pub const fn color(self) -> TierColor {
        match self {
            Self::AA | Self::A | Self::B => TierColor::Green,
            Self::C => TierColor::Yellow,
            Self::D => TierColor::Orange,
            Self::E | Self::F | Self::G | Self::H => TierColor::Red,
        }
    }

    pub const fn action(self) -> TierAction {
        match self {
            Self::AA | Self::A | Self::B => TierAction::Approve,
            Self::C => TierAction::Review,
            Self::D => TierAction::ReviewWithRestrictions,
            Self::E | Self::F | Self::G | Self::H => TierAction::Deny,
        }
    }

    pub fn classification(self) -> TierClassification {
        TierClassification {
            tier: self,
            code: self.code(),
            label: self.label(),
            provision_pct: self.provision_pct(),
            color: self.color(),
            action: self.action(),
        }
    }
}

/// Serializable view of a tier and its regulatory attributes.
#[derive(Debug, Clone, Serialize)]
pub struct TierClassification {
    pub tier: RiskTier,
    pub code: &'static str,
    pub label: &'static str,
    pub provision_pct: f64,
    pub color: TierColor,
    pub action: TierAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_upper_inclusive() {
        assert_eq!(RiskTier::from_probability(0.0), RiskTier::AA);
        assert_eq!(RiskTier::from_probability(0.005), RiskTier::AA);
        assert_eq!(RiskTier::from_probability(0.0051), RiskTier::A);
        assert_eq!(RiskTier::from_probability(0.01), RiskTier::A);
        assert_eq!(RiskTier::from_probability(0.03), RiskTier::B);
        assert_eq!(RiskTier::from_probability(0.10), RiskTier::C);
        assert_eq!(RiskTier::from_probability(0.30), RiskTier::D);
        assert_eq!(RiskTier::from_probability(0.50), RiskTier::E);
        assert_eq!(RiskTier::from_probability(0.70), RiskTier::F);
        assert_eq!(RiskTier::from_probability(1.0), RiskTier::G);
        assert_eq!(RiskTier::from_probability(1.01), RiskTier::H);
    }

    #[test]
    fn provisioning_increases_with_tier() {
        let provisions: Vec<f64> = RiskTier::ordered()
            .into_iter()
            .map(RiskTier::provision_pct)
            .collect();
        assert!(provisions.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(provisions.first(), Some(&0.0));
        assert_eq!(provisions.last(), Some(&100.0));
    }

    #[test]
    fn colors_follow_tier_groups() {
        assert_eq!(RiskTier::B.color(), TierColor::Green);
        assert_eq!(RiskTier::C.color(), TierColor::Yellow);
        assert_eq!(RiskTier::D.color(), TierColor::Orange);
        assert_eq!(RiskTier::E.color(), TierColor::Red);
        assert_eq!(RiskTier::D.action(), TierAction::ReviewWithRestrictions);
    }
}
