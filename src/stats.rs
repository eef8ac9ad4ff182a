//! Risk statistics for summaries and reports.

use crate::risks::Risk;
use crate::taxonomy::{DataBreachProbability, RiskSeverity};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts of a risk list by severity, category and data-breach probability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskStatistics {
    pub total: usize,
    pub by_severity: BTreeMap<RiskSeverity, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub by_data_breach_probability: BTreeMap<DataBreachProbability, usize>,
}

impl RiskStatistics {
    pub fn from_risks(risks: &[Risk]) -> Self {
        let mut stats = Self {
            total: risks.len(),
            ..Self::default()
        };
        for severity in RiskSeverity::DESCENDING {
            stats.by_severity.insert(severity, 0);
        }

        for risk in risks {
            *stats.by_severity.entry(risk.severity).or_default() += 1;
            *stats.by_category.entry(risk.category_id.clone()).or_default() += 1;
            *stats
                .by_data_breach_probability
                .entry(risk.data_breach_probability)
                .or_default() += 1;
        }
        stats
    }

    pub fn count(&self, severity: RiskSeverity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or_default()
    }

    /// Risks rated elevated, high or critical
    pub fn elevated_or_worse(&self) -> usize {
        self.by_severity
            .iter()
            .filter(|(severity, _)| **severity >= RiskSeverity::Elevated)
            .map(|(_, count)| count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risks::RiskScope;
    use crate::taxonomy::{ExploitationImpact, ExploitationLikelihood};

    fn risk(category: &str, id: &str, impact: ExploitationImpact) -> Risk {
        Risk::new(
            category,
            RiskScope::TechnicalAsset(id.to_string()),
            &[],
            ExploitationLikelihood::Unlikely,
            impact,
            id.to_string(),
        )
    }

    #[test]
    fn test_breakdown() {
        let risks = vec![
            risk("unencrypted-asset", "a", ExploitationImpact::High),
            risk("unencrypted-asset", "b", ExploitationImpact::Medium),
            risk("missing-cloud-hardening", "c", ExploitationImpact::VeryHigh)
                .with_data_breach(DataBreachProbability::Probable, vec!["c".to_string()]),
        ];
        let stats = RiskStatistics::from_risks(&risks);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.count(RiskSeverity::Medium), 1);
        assert_eq!(stats.count(RiskSeverity::Low), 1);
        assert_eq!(stats.count(RiskSeverity::Elevated), 1);
        assert_eq!(stats.count(RiskSeverity::Critical), 0);
        assert_eq!(stats.elevated_or_worse(), 1);
        assert_eq!(stats.by_category["unencrypted-asset"], 2);
        assert_eq!(stats.by_data_breach_probability[&DataBreachProbability::Probable], 1);
        assert_eq!(stats.by_data_breach_probability[&DataBreachProbability::Improbable], 2);
    }

    #[test]
    fn test_empty_list_lists_every_severity() {
        let stats = RiskStatistics::from_risks(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.by_severity.len(), 5);
        assert!(stats.by_category.is_empty());
    }
}
