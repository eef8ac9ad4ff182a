//! Unencrypted technical assets storing sensitive data.

use super::{Risk, RiskCategory, RiskRule, RiskScope};
use crate::errors::ThreatloomResult;
use crate::model::{Model, TechnicalAsset};
use crate::taxonomy::{
    Confidentiality, Criticality, DataBreachProbability, EncryptionStyle, ExploitationImpact,
    ExploitationLikelihood, RiskFunction, Stride, TechnologyAttribute,
};

const CATEGORY_ID: &str = "unencrypted-asset";

#[derive(Debug, Default, Clone, Copy)]
pub struct UnencryptedAssetRule;

impl UnencryptedAssetRule {
    pub fn new() -> Self {
        Self
    }

    fn create_risk(
        &self,
        asset: &TechnicalAsset,
        impact: ExploitationImpact,
        requires_end_user_key: bool,
    ) -> Risk {
        let mut title = format!("<b>Unencrypted Technical Asset</b> named <b>{}</b>", asset.title);
        if requires_end_user_key {
            title.push_str(&format!(
                " missing end user individual encryption with {}",
                EncryptionStyle::DataWithEndUserIndividualKey
            ));
        }

        Risk::new(
            CATEGORY_ID,
            RiskScope::TechnicalAsset(asset.id.clone()),
            &[],
            ExploitationLikelihood::Unlikely,
            impact,
            title,
        )
        .with_data_breach(DataBreachProbability::Improbable, vec![asset.id.clone()])
    }
}

/// Assets without storage of their own carry no encryption requirement
fn is_encryption_waiver(asset: &TechnicalAsset) -> bool {
    asset.technologies.get_attribute(&[
        TechnologyAttribute::IsNoStorageAtRest,
        TechnologyAttribute::IsEmbeddedComponent,
    ])
}

impl RiskRule for UnencryptedAssetRule {
    fn category(&self) -> RiskCategory {
        RiskCategory {
            id: CATEGORY_ID.to_string(),
            title: "Unencrypted Technical Assets".to_string(),
            description: "Due to the confidentiality rating of the technical asset itself and/or the stored data \
                assets this technical asset must be encrypted. The risk rating depends on the sensitivity of the \
                technical asset itself and of the data assets stored."
                .to_string(),
            impact: "If this risk is unmitigated, attackers might be able to access unencrypted data when \
                successfully compromising sensitive components."
                .to_string(),
            asvs: "V6 - Stored Cryptography Verification Requirements".to_string(),
            cheat_sheet: "https://cheatsheetseries.owasp.org/cheatsheets/Cryptographic_Storage_Cheat_Sheet.html"
                .to_string(),
            action: "Encryption of Technical Asset".to_string(),
            mitigation: "Apply encryption to the technical asset.".to_string(),
            check: "Are recommendations from the linked cheat sheet and referenced ASVS chapter applied?"
                .to_string(),
            function: RiskFunction::Operations,
            stride: Stride::InformationDisclosure,
            detection_logic: format!(
                "In-scope unencrypted technical assets (excluding assets marked {} and embedded components marked {}) \
                 storing data assets rated at least as {} and {}. For technical assets storing data assets rated as \
                 {} or {} and usually storing end user data the encryption must be of type {}.",
                TechnologyAttribute::IsNoStorageAtRest,
                TechnologyAttribute::IsEmbeddedComponent,
                Confidentiality::Confidential,
                Criticality::Critical,
                Confidentiality::StrictlyConfidential,
                Criticality::MissionCritical,
                EncryptionStyle::DataWithEndUserIndividualKey,
            ),
            risk_assessment: "Depending on the confidentiality rating of the stored data-assets either medium or \
                high risk."
                .to_string(),
            false_positives: "When all sensitive data stored within the asset is already fully encrypted on \
                document or data level."
                .to_string(),
            model_failure_possible_reason: false,
            cwe: 311,
        }
    }

    fn supported_tags(&self) -> Vec<String> {
        Vec::new()
    }

    fn generate_risks(&self, model: &Model) -> ThreatloomResult<Vec<Risk>> {
        let mut risks = Vec::new();

        for id in model.sorted_technical_asset_ids() {
            let asset = model.technical_asset(id)?;
            if asset.out_of_scope || is_encryption_waiver(asset) || asset.data_assets_stored.is_empty() {
                continue;
            }

            let highest_confidentiality = model.highest_stored_confidentiality(asset);
            let highest_integrity = model.highest_stored_integrity(asset);
            if highest_confidentiality < Confidentiality::Confidential || highest_integrity < Criticality::Critical {
                continue;
            }

            let very_sensitive = highest_confidentiality == Confidentiality::StrictlyConfidential
                || highest_integrity == Criticality::MissionCritical;
            let requires_end_user_key = very_sensitive
                && asset
                    .technologies
                    .get_attribute(&[TechnologyAttribute::IsUsuallyStoringEndUserData]);

            if asset.encryption == EncryptionStyle::NoneEncryption {
                let impact = if very_sensitive {
                    ExploitationImpact::High
                } else {
                    ExploitationImpact::Medium
                };
                risks.push(self.create_risk(asset, impact, requires_end_user_key));
            } else if requires_end_user_key && asset.encryption != EncryptionStyle::DataWithEndUserIndividualKey {
                risks.push(self.create_risk(asset, ExploitationImpact::Medium, requires_end_user_key));
            }
        }

        log::debug!("{}: {} risks", CATEGORY_ID, risks.len());
        Ok(risks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataAsset, ModelBuilder};
    use crate::taxonomy::{RiskSeverity, TechnicalAssetType, Technologies};

    fn kv_model(
        data: DataAsset,
        encryption: EncryptionStyle,
        technologies: Technologies,
    ) -> ThreatloomResult<Model> {
        ModelBuilder::new("kv")
            .with_technical_asset(TechnicalAsset {
                asset_type: TechnicalAssetType::Datastore,
                confidentiality: Confidentiality::Confidential,
                encryption,
                technologies,
                data_assets_stored: vec![data.id.clone()],
                ..TechnicalAsset::new("kv", "Key Value Store")
            })
            .with_data_asset(data)
            .build()
    }

    fn pii(confidentiality: Confidentiality, integrity: Criticality) -> DataAsset {
        DataAsset {
            confidentiality,
            integrity,
            availability: Criticality::Operational,
            ..DataAsset::new("pii", "PII")
        }
    }

    #[test]
    fn test_unencrypted_confidential_store_is_medium() -> ThreatloomResult<()> {
        let model = kv_model(
            pii(Confidentiality::Confidential, Criticality::Critical),
            EncryptionStyle::NoneEncryption,
            Technologies::new(),
        )?;
        let risks = UnencryptedAssetRule::new().generate_risks(&model)?;

        assert_eq!(risks.len(), 1);
        let risk = &risks[0];
        assert_eq!(risk.category_id, "unencrypted-asset");
        assert_eq!(risk.synthetic_id, "unencrypted-asset@kv");
        assert_eq!(risk.exploitation_impact, ExploitationImpact::Medium);
        assert_eq!(risk.severity, RiskSeverity::Low);
        assert_eq!(risk.most_relevant_technical_asset_id(), Some("kv"));
        assert_eq!(risk.data_breach_probability, DataBreachProbability::Improbable);
        assert_eq!(risk.data_breach_technical_asset_ids, vec!["kv".to_string()]);
        Ok(())
    }

    #[test]
    fn test_very_sensitive_unencrypted_is_high() -> ThreatloomResult<()> {
        let model = kv_model(
            pii(Confidentiality::StrictlyConfidential, Criticality::Critical),
            EncryptionStyle::NoneEncryption,
            Technologies::new(),
        )?;
        let risks = UnencryptedAssetRule::new().generate_risks(&model)?;
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].exploitation_impact, ExploitationImpact::High);
        assert!(!risks[0].title.contains("end user"));
        Ok(())
    }

    #[test]
    fn test_end_user_key_required() -> ThreatloomResult<()> {
        let model = kv_model(
            pii(Confidentiality::StrictlyConfidential, Criticality::MissionCritical),
            EncryptionStyle::Transparent,
            Technologies::from([TechnologyAttribute::IsUsuallyStoringEndUserData]),
        )?;
        let risks = UnencryptedAssetRule::new().generate_risks(&model)?;

        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].exploitation_impact, ExploitationImpact::Medium);
        assert!(risks[0]
            .title
            .contains("missing end user individual encryption with data-with-end-user-individual-key"));
        Ok(())
    }

    #[test]
    fn test_end_user_key_present_or_not_required() -> ThreatloomResult<()> {
        let model = kv_model(
            pii(Confidentiality::StrictlyConfidential, Criticality::MissionCritical),
            EncryptionStyle::DataWithEndUserIndividualKey,
            Technologies::from([TechnologyAttribute::IsUsuallyStoringEndUserData]),
        )?;
        assert!(UnencryptedAssetRule::new().generate_risks(&model)?.is_empty());

        let model = kv_model(
            pii(Confidentiality::StrictlyConfidential, Criticality::MissionCritical),
            EncryptionStyle::Transparent,
            Technologies::new(),
        )?;
        assert!(UnencryptedAssetRule::new().generate_risks(&model)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_skips_waivers_low_ratings_and_empty_storage() -> ThreatloomResult<()> {
        let rule = UnencryptedAssetRule::new();

        let model = kv_model(
            pii(Confidentiality::Confidential, Criticality::Critical),
            EncryptionStyle::NoneEncryption,
            Technologies::from([TechnologyAttribute::IsNoStorageAtRest]),
        )?;
        assert!(rule.generate_risks(&model)?.is_empty());

        let model = kv_model(
            pii(Confidentiality::Confidential, Criticality::Important),
            EncryptionStyle::NoneEncryption,
            Technologies::new(),
        )?;
        assert!(rule.generate_risks(&model)?.is_empty());

        let model = ModelBuilder::new("nothing stored")
            .with_technical_asset(TechnicalAsset {
                confidentiality: Confidentiality::StrictlyConfidential,
                integrity: Criticality::MissionCritical,
                ..TechnicalAsset::new("cache", "Cache")
            })
            .build()?;
        assert!(rule.generate_risks(&model)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_out_of_scope_contributes_nothing() -> ThreatloomResult<()> {
        let with_external = ModelBuilder::new("external")
            .with_data_asset(pii(Confidentiality::StrictlyConfidential, Criticality::MissionCritical))
            .with_technical_asset(TechnicalAsset {
                out_of_scope: true,
                data_assets_stored: vec!["pii".to_string()],
                ..TechnicalAsset::new("partner-db", "Partner DB")
            })
            .build()?;
        assert!(UnencryptedAssetRule::new().generate_risks(&with_external)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_category_metadata() {
        let category = UnencryptedAssetRule::new().category();
        assert_eq!(category.cwe, 311);
        assert_eq!(category.stride, Stride::InformationDisclosure);
        assert_eq!(category.function, RiskFunction::Operations);
        assert!(UnencryptedAssetRule::new().supported_tags().is_empty());
    }
}
