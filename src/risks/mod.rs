//! Risk Module - Rule contract, findings and the built-in rule registry
//!
//! A rule is a value implementing [`RiskRule`]: it describes its category,
//! names the tags it consults and turns a read-only [`Model`] into findings.
//! Rules must iterate the model in sorted id order so their output never
//! depends on container iteration order.

pub mod aggregate;
pub mod missing_cloud_hardening;
pub mod unencrypted_asset;

pub use missing_cloud_hardening::MissingCloudHardeningRule;
pub use unencrypted_asset::UnencryptedAssetRule;

use crate::errors::ThreatloomResult;
use crate::model::{Model, ID_SEPARATOR};
use crate::taxonomy::{
    calculate_severity, DataBreachProbability, ExploitationImpact, ExploitationLikelihood,
    RiskFunction, RiskSeverity, Stride,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Descriptive metadata shared by every finding of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCategory {
    pub id: String,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub asvs: String,
    pub cheat_sheet: String,
    pub action: String,
    pub mitigation: String,
    pub check: String,
    pub function: RiskFunction,
    pub stride: Stride,
    pub detection_logic: String,
    pub risk_assessment: String,
    pub false_positives: String,
    pub model_failure_possible_reason: bool,
    pub cwe: u32,
}

/// Model element a finding is attached to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum RiskScope {
    TechnicalAsset(String),
    TrustBoundary(String),
    SharedRuntime(String),
    ModelWide,
}

impl RiskScope {
    pub fn id(&self) -> Option<&str> {
        match self {
            RiskScope::TechnicalAsset(id) | RiskScope::TrustBoundary(id) | RiskScope::SharedRuntime(id) => {
                Some(id)
            }
            RiskScope::ModelWide => None,
        }
    }
}

impl fmt::Display for RiskScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskScope::TechnicalAsset(id) => write!(f, "technical asset '{}'", id),
            RiskScope::TrustBoundary(id) => write!(f, "trust boundary '{}'", id),
            RiskScope::SharedRuntime(id) => write!(f, "shared runtime '{}'", id),
            RiskScope::ModelWide => write!(f, "model"),
        }
    }
}

/// A single finding produced by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    pub synthetic_id: String,
    pub category_id: String,
    pub severity: RiskSeverity,
    pub exploitation_likelihood: ExploitationLikelihood,
    pub exploitation_impact: ExploitationImpact,
    pub title: String,
    pub scope: RiskScope,
    pub data_breach_probability: DataBreachProbability,
    pub data_breach_technical_asset_ids: Vec<String>,
}

impl Risk {
    /// Finding whose severity follows from likelihood and impact; the synthetic
    /// id is `<category>@<scope id>` plus any extra qualifiers
    pub fn new(
        category_id: &str,
        scope: RiskScope,
        qualifiers: &[&str],
        likelihood: ExploitationLikelihood,
        impact: ExploitationImpact,
        title: String,
    ) -> Self {
        let mut synthetic_id = category_id.to_string();
        if let Some(scope_id) = scope.id() {
            synthetic_id.push(ID_SEPARATOR);
            synthetic_id.push_str(scope_id);
        }
        for qualifier in qualifiers {
            synthetic_id.push(ID_SEPARATOR);
            synthetic_id.push_str(qualifier);
        }

        Self {
            synthetic_id,
            category_id: category_id.to_string(),
            severity: calculate_severity(likelihood, impact),
            exploitation_likelihood: likelihood,
            exploitation_impact: impact,
            title,
            scope,
            data_breach_probability: DataBreachProbability::Improbable,
            data_breach_technical_asset_ids: Vec::new(),
        }
    }

    pub fn with_data_breach(
        mut self,
        probability: DataBreachProbability,
        technical_asset_ids: Vec<String>,
    ) -> Self {
        self.data_breach_probability = probability;
        self.data_breach_technical_asset_ids = technical_asset_ids;
        self
    }

    pub fn most_relevant_technical_asset_id(&self) -> Option<&str> {
        match &self.scope {
            RiskScope::TechnicalAsset(id) => Some(id),
            _ => None,
        }
    }

    pub fn most_relevant_trust_boundary_id(&self) -> Option<&str> {
        match &self.scope {
            RiskScope::TrustBoundary(id) => Some(id),
            _ => None,
        }
    }

    pub fn most_relevant_shared_runtime_id(&self) -> Option<&str> {
        match &self.scope {
            RiskScope::SharedRuntime(id) => Some(id),
            _ => None,
        }
    }
}

/// Capability set of a risk rule
///
/// `generate_risks` is a pure function of the model; the engine may call rules
/// concurrently from worker threads.
pub trait RiskRule: Send + Sync {
    fn category(&self) -> RiskCategory;

    /// Every tag this rule consults
    fn supported_tags(&self) -> Vec<String>;

    fn generate_risks(&self, model: &Model) -> ThreatloomResult<Vec<Risk>>;
}

/// Built-in rules, ordered by category id
pub fn list_built_in_rules() -> Vec<Box<dyn RiskRule>> {
    let mut rules: Vec<Box<dyn RiskRule>> = vec![
        Box::new(MissingCloudHardeningRule::new()),
        Box::new(UnencryptedAssetRule::new()),
    ];
    rules.sort_by_cached_key(|rule| rule.category().id);
    rules
}
