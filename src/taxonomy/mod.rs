//! Taxonomy Module
//!
//! Closed enumerations of the threat-modeling domain and their numeric
//! projections:
//! - `rating`: confidentiality, criticality, quantity and encryption ordinals
//! - `technology`: asset types, technology attributes, trust boundary types
//! - `severity`: likelihood, impact, severity and the other risk ordinals

mod rating;
mod severity;
mod technology;

pub use rating::{Confidentiality, Criticality, EncryptionStyle, Quantity};
pub use severity::{
    calculate_severity, DataBreachProbability, ExploitationImpact, ExploitationLikelihood,
    RiskFunction, RiskSeverity, Stride,
};
pub use technology::{TechnicalAssetType, Technologies, TechnologyAttribute, TrustBoundaryType};
