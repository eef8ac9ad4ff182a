//! CIA ratings, data quantities and encryption styles.
//!
//! The attractiveness weights follow Fibonacci schedules: the asset's own
//! rating weighs most, data processed or stored on the asset less, and data
//! merely transferred over a link least.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidentiality rating, ordered from least to most sensitive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidentiality {
    Public,
    #[default]
    Internal,
    Restricted,
    Confidential,
    StrictlyConfidential,
}

impl Confidentiality {
    pub const ALL: [Confidentiality; 5] = [
        Confidentiality::Public,
        Confidentiality::Internal,
        Confidentiality::Restricted,
        Confidentiality::Confidential,
        Confidentiality::StrictlyConfidential,
    ];

    fn ordinal(self) -> usize {
        self as usize
    }

    /// Weight of the asset's own confidentiality rating (Fibonacci from 8)
    pub fn attacker_attractiveness_for_asset(self) -> f64 {
        [8.0, 13.0, 21.0, 34.0, 55.0][self.ordinal()]
    }

    /// Weight of a data asset processed or stored on the asset (Fibonacci from 5)
    pub fn attacker_attractiveness_for_processed_or_stored_data(self) -> f64 {
        [5.0, 8.0, 13.0, 21.0, 34.0][self.ordinal()]
    }

    /// Weight of a data asset sent or received over a link (Fibonacci from 2)
    pub fn attacker_attractiveness_for_in_out_transferred_data(self) -> f64 {
        [2.0, 3.0, 5.0, 8.0, 13.0][self.ordinal()]
    }
}

impl fmt::Display for Confidentiality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidentiality::Public => write!(f, "public"),
            Confidentiality::Internal => write!(f, "internal"),
            Confidentiality::Restricted => write!(f, "restricted"),
            Confidentiality::Confidential => write!(f, "confidential"),
            Confidentiality::StrictlyConfidential => write!(f, "strictly-confidential"),
        }
    }
}

/// Integrity and availability rating, ordered from least to most critical
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criticality {
    Archive,
    #[default]
    Operational,
    Important,
    Critical,
    MissionCritical,
}

impl Criticality {
    pub const ALL: [Criticality; 5] = [
        Criticality::Archive,
        Criticality::Operational,
        Criticality::Important,
        Criticality::Critical,
        Criticality::MissionCritical,
    ];

    fn ordinal(self) -> usize {
        self as usize
    }

    /// Weight of the asset's own integrity or availability rating (Fibonacci from 5)
    pub fn attacker_attractiveness_for_asset(self) -> f64 {
        [5.0, 8.0, 13.0, 21.0, 34.0][self.ordinal()]
    }

    /// Weight of a data asset processed or stored on the asset (Fibonacci from 3)
    pub fn attacker_attractiveness_for_processed_or_stored_data(self) -> f64 {
        [3.0, 5.0, 8.0, 13.0, 21.0][self.ordinal()]
    }

    /// Weight of a data asset sent or received over a link (Fibonacci from 2)
    pub fn attacker_attractiveness_for_in_out_transferred_data(self) -> f64 {
        [2.0, 3.0, 5.0, 8.0, 13.0][self.ordinal()]
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criticality::Archive => write!(f, "archive"),
            Criticality::Operational => write!(f, "operational"),
            Criticality::Important => write!(f, "important"),
            Criticality::Critical => write!(f, "critical"),
            Criticality::MissionCritical => write!(f, "mission-critical"),
        }
    }
}

/// Amount of records a data asset represents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quantity {
    VeryFew,
    #[default]
    Few,
    Many,
    VeryMany,
}

impl Quantity {
    /// Multiplier applied to the C and I weights of a data asset
    pub fn quantity_factor(self) -> f64 {
        match self {
            Quantity::VeryFew => 0.4,
            Quantity::Few => 1.0,
            Quantity::Many => 3.0,
            Quantity::VeryMany => 10.0,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::VeryFew => write!(f, "very-few"),
            Quantity::Few => write!(f, "few"),
            Quantity::Many => write!(f, "many"),
            Quantity::VeryMany => write!(f, "very-many"),
        }
    }
}

/// Encryption at rest applied to a technical asset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncryptionStyle {
    #[default]
    #[serde(rename = "none")]
    NoneEncryption,
    Transparent,
    DataWithSymmetricSharedKey,
    DataWithAsymmetricSharedKey,
    DataWithEndUserIndividualKey,
}

impl fmt::Display for EncryptionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionStyle::NoneEncryption => write!(f, "none"),
            EncryptionStyle::Transparent => write!(f, "transparent"),
            EncryptionStyle::DataWithSymmetricSharedKey => write!(f, "data-with-symmetric-shared-key"),
            EncryptionStyle::DataWithAsymmetricSharedKey => write!(f, "data-with-asymmetric-shared-key"),
            EncryptionStyle::DataWithEndUserIndividualKey => {
                write!(f, "data-with-end-user-individual-key")
            }
        }
    }
}
