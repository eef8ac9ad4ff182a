//! Risk ordinals and the severity matrix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How likely an attacker exploits a finding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExploitationLikelihood {
    #[default]
    Unlikely,
    Likely,
    VeryLikely,
    Frequent,
}

impl fmt::Display for ExploitationLikelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExploitationLikelihood::Unlikely => write!(f, "unlikely"),
            ExploitationLikelihood::Likely => write!(f, "likely"),
            ExploitationLikelihood::VeryLikely => write!(f, "very-likely"),
            ExploitationLikelihood::Frequent => write!(f, "frequent"),
        }
    }
}

/// Damage caused when a finding is exploited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExploitationImpact {
    #[default]
    Low,
    Medium,
    High,
    VeryHigh,
}

impl fmt::Display for ExploitationImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExploitationImpact::Low => write!(f, "low"),
            ExploitationImpact::Medium => write!(f, "medium"),
            ExploitationImpact::High => write!(f, "high"),
            ExploitationImpact::VeryHigh => write!(f, "very-high"),
        }
    }
}

/// Ordinal severity of a risk, `Low` being the least severe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskSeverity {
    #[default]
    Low,
    Medium,
    Elevated,
    High,
    Critical,
}

impl RiskSeverity {
    /// All severities from most to least severe
    pub const DESCENDING: [RiskSeverity; 5] = [
        RiskSeverity::Critical,
        RiskSeverity::High,
        RiskSeverity::Elevated,
        RiskSeverity::Medium,
        RiskSeverity::Low,
    ];
}

impl fmt::Display for RiskSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskSeverity::Low => write!(f, "low"),
            RiskSeverity::Medium => write!(f, "medium"),
            RiskSeverity::Elevated => write!(f, "elevated"),
            RiskSeverity::High => write!(f, "high"),
            RiskSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Probability that exploiting a risk leaks data of the affected assets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataBreachProbability {
    #[default]
    Improbable,
    Possible,
    Probable,
    Certain,
}

impl fmt::Display for DataBreachProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataBreachProbability::Improbable => write!(f, "improbable"),
            DataBreachProbability::Possible => write!(f, "possible"),
            DataBreachProbability::Probable => write!(f, "probable"),
            DataBreachProbability::Certain => write!(f, "certain"),
        }
    }
}

/// STRIDE classification of a risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stride {
    Spoofing,
    Tampering,
    Repudiation,
    InformationDisclosure,
    DenialOfService,
    ElevationOfPrivilege,
}

impl fmt::Display for Stride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stride::Spoofing => write!(f, "Spoofing"),
            Stride::Tampering => write!(f, "Tampering"),
            Stride::Repudiation => write!(f, "Repudiation"),
            Stride::InformationDisclosure => write!(f, "Information Disclosure"),
            Stride::DenialOfService => write!(f, "Denial of Service"),
            Stride::ElevationOfPrivilege => write!(f, "Elevation of Privilege"),
        }
    }
}

/// Organisational function responsible for mitigating a risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskFunction {
    BusinessSide,
    Architecture,
    Development,
    Operations,
}

impl fmt::Display for RiskFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskFunction::BusinessSide => write!(f, "Business Side"),
            RiskFunction::Architecture => write!(f, "Architecture"),
            RiskFunction::Development => write!(f, "Development"),
            RiskFunction::Operations => write!(f, "Operations"),
        }
    }
}

/// Map likelihood and impact to a severity via the fixed risk matrix
pub fn calculate_severity(
    likelihood: ExploitationLikelihood,
    impact: ExploitationImpact,
) -> RiskSeverity {
    use ExploitationImpact as I;
    use ExploitationLikelihood as L;
    use RiskSeverity as S;

    match (likelihood, impact) {
        (L::Unlikely, I::Low) | (L::Unlikely, I::Medium) | (L::Likely, I::Low) => S::Low,
        (L::Unlikely, I::High) | (L::Likely, I::Medium) | (L::VeryLikely, I::Low) => S::Medium,
        (L::Unlikely, I::VeryHigh)
        | (L::Likely, I::High)
        | (L::VeryLikely, I::Medium)
        | (L::Frequent, I::Low) => S::Elevated,
        (L::Likely, I::VeryHigh) | (L::VeryLikely, I::High) | (L::Frequent, I::Medium) => S::High,
        (L::VeryLikely, I::VeryHigh) | (L::Frequent, I::High) | (L::Frequent, I::VeryHigh) => {
            S::Critical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_matrix() {
        use ExploitationImpact as I;
        use ExploitationLikelihood as L;
        use RiskSeverity as S;

        let rows = [
            (L::Unlikely, [S::Low, S::Low, S::Medium, S::Elevated]),
            (L::Likely, [S::Low, S::Medium, S::Elevated, S::High]),
            (L::VeryLikely, [S::Medium, S::Elevated, S::High, S::Critical]),
            (L::Frequent, [S::Elevated, S::High, S::Critical, S::Critical]),
        ];
        let impacts = [I::Low, I::Medium, I::High, I::VeryHigh];

        for (likelihood, expected) in rows {
            for (impact, severity) in impacts.iter().zip(expected) {
                assert_eq!(
                    calculate_severity(likelihood, *impact),
                    severity,
                    "{} x {}",
                    likelihood,
                    impact
                );
            }
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(RiskSeverity::Critical > RiskSeverity::High);
        assert!(RiskSeverity::Elevated > RiskSeverity::Medium);
        assert_eq!(RiskSeverity::DESCENDING[0], RiskSeverity::Critical);
    }
}
