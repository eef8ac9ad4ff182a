//! Model entities: technical assets, links, data assets, trust boundaries
//! and shared runtimes. Entities refer to each other by id only.

use crate::tags::Tagged;
use crate::taxonomy::{
    Confidentiality, Criticality, EncryptionStyle, Quantity, TechnicalAssetType, Technologies,
    TrustBoundaryType,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalAsset {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub asset_type: TechnicalAssetType,
    pub technologies: Technologies,
    pub confidentiality: Confidentiality,
    pub integrity: Criticality,
    pub availability: Criticality,
    pub out_of_scope: bool,
    pub multi_tenant: bool,
    pub encryption: EncryptionStyle,
    pub tags: Vec<String>,
    pub data_assets_processed: Vec<String>,
    pub data_assets_stored: Vec<String>,
    pub communication_links: Vec<CommunicationLink>,
    /// Relative attacker attractiveness, written once by the RAA pass
    #[serde(skip_deserializing)]
    pub raa: f64,
}

impl TechnicalAsset {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            asset_type: TechnicalAssetType::Process,
            technologies: Technologies::new(),
            confidentiality: Confidentiality::Internal,
            integrity: Criticality::Operational,
            availability: Criticality::Operational,
            out_of_scope: false,
            multi_tenant: false,
            encryption: EncryptionStyle::NoneEncryption,
            tags: Vec::new(),
            data_assets_processed: Vec::new(),
            data_assets_stored: Vec::new(),
            communication_links: Vec::new(),
            raa: 0.0,
        }
    }
}

impl Default for TechnicalAsset {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl Tagged for TechnicalAsset {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Outbound data flow from the owning technical asset to `target_id`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunicationLink {
    pub id: String,
    pub title: String,
    pub target_id: String,
    pub data_assets_sent: Vec<String>,
    pub data_assets_received: Vec<String>,
    pub tags: Vec<String>,
}

impl CommunicationLink {
    pub fn new(id: impl Into<String>, target_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            target_id: target_id.into(),
            ..Self::default()
        }
    }
}

impl Tagged for CommunicationLink {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataAsset {
    pub id: String,
    pub title: String,
    pub confidentiality: Confidentiality,
    pub integrity: Criticality,
    pub availability: Criticality,
    pub quantity: Quantity,
    pub tags: Vec<String>,
}

impl DataAsset {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Tagged for DataAsset {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustBoundary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub boundary_type: TrustBoundaryType,
    pub tags: Vec<String>,
    pub technical_assets_inside: Vec<String>,
    pub trust_boundaries_nested: Vec<String>,
    /// Enclosing boundary, derived from the nesting lists when the model is built
    #[serde(skip_deserializing)]
    pub parent: Option<String>,
}

impl TrustBoundary {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn is_within_cloud(&self) -> bool {
        self.boundary_type.is_within_cloud()
    }
}

impl Tagged for TrustBoundary {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedRuntime {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub technical_assets_running: Vec<String>,
}

impl SharedRuntime {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn runs(&self, technical_asset_id: &str) -> bool {
        self.technical_assets_running
            .iter()
            .any(|id| id == technical_asset_id)
    }
}

impl Tagged for SharedRuntime {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}
