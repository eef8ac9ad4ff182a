//! Missing cloud hardening.
//!
//! Cloud components are found through provider tags (`aws`, `azure`, `gcp`,
//! `ocp` and AWS service sub-tags) and through cloud-typed trust boundaries.
//! Findings collapse to one generic risk per provider and tagged scope, with
//! the most sensitive asset standing in when no runtime or boundary carries
//! the provider. Assets with AWS service tags get service-specific findings.

use super::aggregate::{most_sensitive_technical_asset, CloudBuckets, CloudProvider, AWS_SUB_TAGS};
use super::{Risk, RiskCategory, RiskRule, RiskScope};
use crate::errors::ThreatloomResult;
use crate::model::{Model, SharedRuntime, TechnicalAsset, TrustBoundary};
use crate::tags::{is_technical_asset_tagged_with_any_traversing_up, Tagged};
use crate::taxonomy::{
    Confidentiality, Criticality, DataBreachProbability, ExploitationImpact, ExploitationLikelihood,
    RiskFunction, Stride,
};
use std::collections::BTreeSet;

const CATEGORY_ID: &str = "missing-cloud-hardening";

/// Sub-tag, title label and hardening guide of service-specific findings
const SUB_TAG_FINDINGS: [(&str, &str, &str); 5] = [
    ("aws:ec2", "EC2", "CIS Benchmark for Amazon Linux"),
    ("aws:s3", "S3", "CIS Benchmark for AWS and Security Best Practices for AWS S3"),
    ("aws:lambda", "Lambda", "Security Best Practices for AWS Lambda"),
    ("aws:rds", "RDS", "Security Best Practices for Amazon RDS"),
    ("aws:dynamodb", "DynamoDB", "Security Best Practices for Amazon DynamoDB"),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct MissingCloudHardeningRule;

/// Provider or service label plus the guide named in the finding title
type Qualifier<'a> = Option<(&'a str, &'a str)>;

impl MissingCloudHardeningRule {
    pub fn new() -> Self {
        Self
    }

    fn supported_tag_refs() -> Vec<&'static str> {
        CloudProvider::ALL
            .iter()
            .map(|provider| provider.base_tag())
            .chain(AWS_SUB_TAGS)
            .collect()
    }

    fn classify(&self, model: &Model) -> ThreatloomResult<CloudBuckets> {
        let supported = Self::supported_tag_refs();
        let mut buckets = CloudBuckets::new();

        for boundary in model.trust_boundaries().values() {
            let tagged = boundary.is_tagged_with_any(&supported);
            if !tagged && !boundary.is_within_cloud() {
                continue;
            }
            if tagged {
                buckets.trust_boundaries.add_by_tags(&boundary.id, &boundary.tags);
            } else {
                buckets.trust_boundaries.add_unspecific(&boundary.id);
            }

            for asset_id in model.recursively_all_technical_asset_ids_inside(boundary) {
                let asset = model.technical_asset(&asset_id)?;
                if asset.out_of_scope {
                    continue;
                }
                if asset.is_tagged_with_any(&supported) {
                    buckets.add_technical_asset(asset, &asset.tags);
                } else if tagged {
                    buckets.add_technical_asset(asset, &boundary.tags);
                } else {
                    buckets.technical_assets.add_unspecific(&asset.id);
                }
            }
        }

        for asset in model.technical_assets_tagged_with_any(&supported) {
            if !asset.out_of_scope {
                buckets.add_technical_asset(asset, &asset.tags);
            }
        }

        for runtime in model.shared_runtimes().values() {
            if runtime.is_tagged_with_any(&supported) {
                buckets.shared_runtimes.add_by_tags(&runtime.id, &runtime.tags);
            } else if runs_inside_cloud(model, runtime) {
                buckets.shared_runtimes.add_unspecific(&runtime.id);
            }
            for asset in model.in_scope_technical_assets(&runtime.technical_assets_running) {
                buckets.add_technical_asset(asset, &runtime.tags);
            }
        }

        buckets.subsume();
        Ok(buckets)
    }

    fn title(scope_title: &str, qualifier: Qualifier<'_>) -> String {
        match qualifier {
            Some((label, details)) => format!(
                "<b>Missing Cloud Hardening ({})</b> risk at <b>{}</b>: <u>{}</u>",
                label, scope_title, details
            ),
            None => format!("<b>Missing Cloud Hardening</b> risk at <b>{}</b>", scope_title),
        }
    }

    fn create_risk(
        &self,
        scope: RiskScope,
        scope_title: &str,
        qualifier: Qualifier<'_>,
        impact: ExploitationImpact,
        mut breached: Vec<String>,
    ) -> Risk {
        breached.sort();
        let suffix = qualifier.map(|(label, _)| label.to_lowercase());
        let qualifiers: Vec<&str> = suffix.as_deref().into_iter().collect();

        Risk::new(
            CATEGORY_ID,
            scope,
            &qualifiers,
            ExploitationLikelihood::Unlikely,
            impact,
            Self::title(scope_title, qualifier),
        )
        .with_data_breach(DataBreachProbability::Probable, breached)
    }

    fn create_risk_for_shared_runtime(
        &self,
        model: &Model,
        runtime: &SharedRuntime,
        qualifier: Qualifier<'_>,
    ) -> Risk {
        let impact = impact_of(
            model.find_shared_runtime_highest_confidentiality(runtime),
            model.find_shared_runtime_highest_integrity(runtime),
            model.find_shared_runtime_highest_availability(runtime),
        );
        let breached = model
            .in_scope_technical_assets(&runtime.technical_assets_running)
            .map(|asset| asset.id.clone())
            .collect();
        self.create_risk(
            RiskScope::SharedRuntime(runtime.id.clone()),
            &runtime.title,
            qualifier,
            impact,
            breached,
        )
    }

    fn create_risk_for_trust_boundary(
        &self,
        model: &Model,
        boundary: &TrustBoundary,
        qualifier: Qualifier<'_>,
    ) -> Risk {
        let impact = impact_of(
            model.find_trust_boundary_highest_confidentiality(boundary),
            model.find_trust_boundary_highest_integrity(boundary),
            model.find_trust_boundary_highest_availability(boundary),
        );
        let inside = model.recursively_all_technical_asset_ids_inside(boundary);
        let breached = model
            .in_scope_technical_assets(&inside)
            .map(|asset| asset.id.clone())
            .collect();
        self.create_risk(
            RiskScope::TrustBoundary(boundary.id.clone()),
            &boundary.title,
            qualifier,
            impact,
            breached,
        )
    }

    fn create_risk_for_technical_asset(
        &self,
        model: &Model,
        asset: &TechnicalAsset,
        qualifier: Qualifier<'_>,
    ) -> Risk {
        let impact = impact_of(
            model.highest_processed_confidentiality(asset),
            model.highest_processed_integrity(asset),
            model.highest_processed_availability(asset),
        );
        self.create_risk(
            RiskScope::TechnicalAsset(asset.id.clone()),
            &asset.title,
            qualifier,
            impact,
            vec![asset.id.clone()],
        )
    }
}

/// An in-scope running asset sits in a cloud-typed boundary, directly or
/// through an enclosing one
fn runs_inside_cloud(model: &Model, runtime: &SharedRuntime) -> bool {
    model
        .in_scope_technical_assets(&runtime.technical_assets_running)
        .any(|asset| {
            let mut current = model
                .technical_asset_trust_boundary_id(asset)
                .and_then(|id| model.trust_boundaries().get(id));
            while let Some(boundary) = current {
                if boundary.is_within_cloud() {
                    return true;
                }
                current = model.find_parent_trust_boundary(boundary);
            }
            false
        })
}

fn impact_of(
    confidentiality: Confidentiality,
    integrity: Criticality,
    availability: Criticality,
) -> ExploitationImpact {
    if confidentiality == Confidentiality::StrictlyConfidential
        || integrity == Criticality::MissionCritical
        || availability == Criticality::MissionCritical
    {
        ExploitationImpact::VeryHigh
    } else if confidentiality >= Confidentiality::Confidential
        || integrity >= Criticality::Critical
        || availability >= Criticality::Critical
    {
        ExploitationImpact::High
    } else {
        ExploitationImpact::Medium
    }
}

impl RiskRule for MissingCloudHardeningRule {
    fn category(&self) -> RiskCategory {
        RiskCategory {
            id: CATEGORY_ID.to_string(),
            title: "Missing Cloud Hardening".to_string(),
            description: "Cloud components should be hardened according to the cloud vendor best practices. \
                This affects their configuration, auditing, and further areas."
                .to_string(),
            impact: "If this risk is unmitigated, attackers might access cloud components in an unintended way."
                .to_string(),
            asvs: "V1 - Architecture, Design and Threat Modeling Requirements".to_string(),
            cheat_sheet: "https://cheatsheetseries.owasp.org/cheatsheets/Attack_Surface_Analysis_Cheat_Sheet.html"
                .to_string(),
            action: "Cloud Hardening".to_string(),
            mitigation: "Apply hardening of all cloud components and services, taking special care to follow \
                the individual risk descriptions (which depend on the cloud provider tags in the model).\
                <br><br>For <b>Amazon Web Services (AWS)</b>: Follow the <i>CIS Benchmark for Amazon Web \
                Services</i>. For EC2 and other servers running Amazon Linux, follow the <i>CIS Benchmark for \
                Amazon Linux</i> and switch to IMDSv2. For S3 buckets follow the <i>Security Best Practices for \
                Amazon S3</i> to avoid accidental leakage.\
                <br><br>For <b>Microsoft Azure</b>: Follow the <i>CIS Benchmark for Microsoft Azure</i>.\
                <br><br>For <b>Google Cloud Platform</b>: Follow the <i>CIS Benchmark for Google Cloud Computing \
                Platform</i>.\
                <br><br>For <b>Oracle Cloud Platform</b>: Follow the vendor hardening best practices."
                .to_string(),
            check: "Are recommendations from the linked cheat sheet and referenced ASVS chapter applied?"
                .to_string(),
            function: RiskFunction::Operations,
            stride: Stride::Tampering,
            detection_logic: "In-scope cloud components (either residing in cloud trust boundaries or more \
                specifically tagged with cloud provider types)."
                .to_string(),
            risk_assessment: "The risk rating depends on the sensitivity of the technical asset itself and of \
                the data assets processed."
                .to_string(),
            false_positives: "Cloud components not running parts of the target architecture can be considered \
                as false positives after individual review."
                .to_string(),
            model_failure_possible_reason: false,
            cwe: 1008,
        }
    }

    fn supported_tags(&self) -> Vec<String> {
        Self::supported_tag_refs().into_iter().map(String::from).collect()
    }

    fn generate_risks(&self, model: &Model) -> ThreatloomResult<Vec<Risk>> {
        let buckets = self.classify(model)?;
        let mut risks = Vec::new();
        let mut covered: BTreeSet<CloudProvider> = BTreeSet::new();

        for provider in CloudProvider::ALL {
            for id in buckets.shared_runtimes.provider(provider) {
                let runtime = model.shared_runtime(id)?;
                let qualifier = Some((provider.label(), provider.details()));
                risks.push(self.create_risk_for_shared_runtime(model, runtime, qualifier));
                covered.insert(provider);
            }
        }
        for id in buckets.shared_runtimes.unspecific() {
            let runtime = model.shared_runtime(id)?;
            risks.push(self.create_risk_for_shared_runtime(model, runtime, None));
        }

        for provider in CloudProvider::ALL {
            for id in buckets.trust_boundaries.provider(provider) {
                let boundary = model.trust_boundary(id)?;
                let qualifier = Some((provider.label(), provider.details()));
                risks.push(self.create_risk_for_trust_boundary(model, boundary, qualifier));
                covered.insert(provider);
            }
        }
        for id in buckets.trust_boundaries.unspecific() {
            let boundary = model.trust_boundary(id)?;
            risks.push(self.create_risk_for_trust_boundary(model, boundary, None));
        }

        for provider in CloudProvider::ALL {
            if covered.contains(&provider) {
                continue;
            }
            let candidates = buckets.technical_assets.provider(provider);
            if let Some(asset) = most_sensitive_technical_asset(model, candidates) {
                let qualifier = Some((provider.label(), provider.details()));
                risks.push(self.create_risk_for_technical_asset(model, asset, qualifier));
            }
        }

        for id in buckets.sub_tag_specific() {
            let asset = model.technical_asset(id)?;
            for (sub_tag, label, details) in SUB_TAG_FINDINGS {
                if is_technical_asset_tagged_with_any_traversing_up(model, asset, &[sub_tag]) {
                    risks.push(self.create_risk_for_technical_asset(model, asset, Some((label, details))));
                }
            }
        }

        for id in buckets.technical_assets.unspecific() {
            let asset = model.technical_asset(id)?;
            risks.push(self.create_risk_for_technical_asset(model, asset, None));
        }

        log::debug!("{}: {} risks", CATEGORY_ID, risks.len());
        Ok(risks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataAsset, ModelBuilder};
    use crate::taxonomy::TrustBoundaryType;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn synthetic_ids(risks: &[Risk]) -> Vec<&str> {
        risks.iter().map(|risk| risk.synthetic_id.as_str()).collect()
    }

    #[test]
    fn test_tagged_boundary_yields_single_generic_risk() -> ThreatloomResult<()> {
        let model = ModelBuilder::new("aws vpc")
            .with_technical_asset(TechnicalAsset::new("a1", "A1"))
            .with_technical_asset(TechnicalAsset::new("a2", "A2"))
            .with_trust_boundary(TrustBoundary {
                tags: ids(&["aws"]),
                technical_assets_inside: ids(&["a1", "a2"]),
                ..TrustBoundary::new("aws-vpc", "AWS VPC")
            })
            .build()?;

        let risks = MissingCloudHardeningRule::new().generate_risks(&model)?;
        assert_eq!(synthetic_ids(&risks), vec!["missing-cloud-hardening@aws-vpc@aws"]);

        let risk = &risks[0];
        assert_eq!(risk.most_relevant_trust_boundary_id(), Some("aws-vpc"));
        assert_eq!(
            risk.title,
            "<b>Missing Cloud Hardening (AWS)</b> risk at <b>AWS VPC</b>: <u>CIS Benchmark for AWS</u>"
        );
        assert_eq!(risk.exploitation_impact, ExploitationImpact::Medium);
        assert_eq!(risk.data_breach_probability, DataBreachProbability::Probable);
        assert_eq!(risk.data_breach_technical_asset_ids, ids(&["a1", "a2"]));
        Ok(())
    }

    #[test]
    fn test_sub_tag_specific_finding() -> ThreatloomResult<()> {
        let model = ModelBuilder::new("s3")
            .with_technical_asset(TechnicalAsset {
                tags: ids(&["aws:s3"]),
                ..TechnicalAsset::new("bucket", "Bucket")
            })
            .with_trust_boundary(TrustBoundary {
                tags: ids(&["aws"]),
                technical_assets_inside: ids(&["bucket"]),
                ..TrustBoundary::new("aws-account", "AWS Account")
            })
            .build()?;

        let risks = MissingCloudHardeningRule::new().generate_risks(&model)?;
        assert_eq!(
            synthetic_ids(&risks),
            vec!["missing-cloud-hardening@aws-account@aws", "missing-cloud-hardening@bucket@s3"]
        );
        let s3 = &risks[1];
        assert!(s3.title.contains("(S3)"));
        assert!(s3.title.contains("CIS Benchmark"));
        assert_eq!(s3.most_relevant_technical_asset_id(), Some("bucket"));
        Ok(())
    }

    #[test]
    fn test_sub_tag_inherited_from_runtime() -> ThreatloomResult<()> {
        let model = ModelBuilder::new("ec2")
            .with_technical_asset(TechnicalAsset {
                tags: ids(&["aws:vpc"]),
                ..TechnicalAsset::new("app", "App")
            })
            .with_shared_runtime(SharedRuntime {
                tags: ids(&["aws:ec2"]),
                technical_assets_running: ids(&["app"]),
                ..SharedRuntime::new("instance", "Instance")
            })
            .build()?;

        let risks = MissingCloudHardeningRule::new().generate_risks(&model)?;
        assert_eq!(
            synthetic_ids(&risks),
            vec!["missing-cloud-hardening@instance@aws", "missing-cloud-hardening@app@ec2"]
        );
        assert_eq!(risks[0].most_relevant_shared_runtime_id(), Some("instance"));
        Ok(())
    }

    #[test]
    fn test_uppercase_tag_falls_back_to_most_sensitive_asset() -> ThreatloomResult<()> {
        let model = ModelBuilder::new("assets only")
            .with_data_asset(DataAsset {
                confidentiality: Confidentiality::StrictlyConfidential,
                ..DataAsset::new("keys", "Keys")
            })
            .with_technical_asset(TechnicalAsset {
                tags: ids(&["AWS"]),
                ..TechnicalAsset::new("api", "API")
            })
            .with_technical_asset(TechnicalAsset {
                tags: ids(&["aws"]),
                data_assets_processed: ids(&["keys"]),
                ..TechnicalAsset::new("kms-client", "KMS Client")
            })
            .build()?;

        let risks = MissingCloudHardeningRule::new().generate_risks(&model)?;
        assert_eq!(synthetic_ids(&risks), vec!["missing-cloud-hardening@kms-client@aws"]);
        assert_eq!(risks[0].exploitation_impact, ExploitationImpact::VeryHigh);
        Ok(())
    }

    #[test]
    fn test_untagged_cloud_boundary_is_unspecific() -> ThreatloomResult<()> {
        let model = ModelBuilder::new("unspecific")
            .with_technical_asset(TechnicalAsset {
                integrity: Criticality::Critical,
                ..TechnicalAsset::new("vm", "VM")
            })
            .with_technical_asset(TechnicalAsset::new("on-prem", "On Prem"))
            .with_trust_boundary(TrustBoundary {
                boundary_type: TrustBoundaryType::NetworkCloudProvider,
                technical_assets_inside: ids(&["vm"]),
                ..TrustBoundary::new("cloud", "Cloud")
            })
            .with_shared_runtime(SharedRuntime {
                technical_assets_running: ids(&["vm"]),
                ..SharedRuntime::new("hypervisor", "Hypervisor")
            })
            .with_shared_runtime(SharedRuntime {
                technical_assets_running: ids(&["on-prem"]),
                ..SharedRuntime::new("rack", "Rack")
            })
            .build()?;

        let risks = MissingCloudHardeningRule::new().generate_risks(&model)?;
        assert_eq!(
            synthetic_ids(&risks),
            vec![
                "missing-cloud-hardening@hypervisor",
                "missing-cloud-hardening@cloud",
                "missing-cloud-hardening@vm",
            ]
        );
        assert_eq!(risks[1].title, "<b>Missing Cloud Hardening</b> risk at <b>Cloud</b>");
        assert!(risks.iter().all(|risk| risk.exploitation_impact == ExploitationImpact::High));
        Ok(())
    }

    #[test]
    fn test_each_tagged_boundary_gets_its_own_provider_risk() -> ThreatloomResult<()> {
        let model = ModelBuilder::new("two accounts")
            .with_technical_asset(TechnicalAsset {
                tags: ids(&["aws"]),
                ..TechnicalAsset::new("a1", "A1")
            })
            .with_technical_asset(TechnicalAsset {
                tags: ids(&["aws"]),
                ..TechnicalAsset::new("a2", "A2")
            })
            .with_trust_boundary(TrustBoundary {
                tags: ids(&["aws"]),
                technical_assets_inside: ids(&["a1"]),
                ..TrustBoundary::new("tb1", "Account One")
            })
            .with_trust_boundary(TrustBoundary {
                tags: ids(&["aws"]),
                technical_assets_inside: ids(&["a2"]),
                ..TrustBoundary::new("tb2", "Account Two")
            })
            .build()?;

        let risks = MissingCloudHardeningRule::new().generate_risks(&model)?;
        assert_eq!(
            synthetic_ids(&risks),
            vec!["missing-cloud-hardening@tb1@aws", "missing-cloud-hardening@tb2@aws"]
        );
        assert_eq!(risks[0].data_breach_technical_asset_ids, ids(&["a1"]));
        assert_eq!(risks[1].data_breach_technical_asset_ids, ids(&["a2"]));
        Ok(())
    }

    #[test]
    fn test_runtime_and_boundary_of_same_provider() -> ThreatloomResult<()> {
        let model = ModelBuilder::new("eks in vpc")
            .with_technical_asset(TechnicalAsset {
                tags: ids(&["aws"]),
                ..TechnicalAsset::new("app", "App")
            })
            .with_technical_asset(TechnicalAsset::new("db", "DB"))
            .with_trust_boundary(TrustBoundary {
                tags: ids(&["aws"]),
                technical_assets_inside: ids(&["app", "db"]),
                ..TrustBoundary::new("vpc", "VPC")
            })
            .with_shared_runtime(SharedRuntime {
                tags: ids(&["aws"]),
                technical_assets_running: ids(&["app"]),
                ..SharedRuntime::new("eks", "EKS")
            })
            .build()?;

        let risks = MissingCloudHardeningRule::new().generate_risks(&model)?;
        assert_eq!(
            synthetic_ids(&risks),
            vec!["missing-cloud-hardening@eks@aws", "missing-cloud-hardening@vpc@aws"]
        );
        assert_eq!(risks[0].most_relevant_shared_runtime_id(), Some("eks"));
        assert_eq!(risks[0].data_breach_technical_asset_ids, ids(&["app"]));
        assert_eq!(risks[1].data_breach_technical_asset_ids, ids(&["app", "db"]));
        Ok(())
    }

    #[test]
    fn test_runtime_breach_ids_are_sorted() -> ThreatloomResult<()> {
        let model = ModelBuilder::new("runtime order")
            .with_technical_asset(TechnicalAsset::new("a", "A"))
            .with_technical_asset(TechnicalAsset::new("b", "B"))
            .with_technical_asset(TechnicalAsset::new("c", "C"))
            .with_shared_runtime(SharedRuntime {
                tags: ids(&["gcp"]),
                technical_assets_running: ids(&["c", "a", "b"]),
                ..SharedRuntime::new("gke", "GKE")
            })
            .build()?;

        let risks = MissingCloudHardeningRule::new().generate_risks(&model)?;
        assert_eq!(synthetic_ids(&risks), vec!["missing-cloud-hardening@gke@gcp"]);
        assert_eq!(risks[0].data_breach_technical_asset_ids, ids(&["a", "b", "c"]));
        Ok(())
    }

    #[test]
    fn test_providers_are_independent() -> ThreatloomResult<()> {
        let model = ModelBuilder::new("multi cloud")
            .with_technical_asset(TechnicalAsset {
                tags: ids(&["gcp"]),
                ..TechnicalAsset::new("bq", "BigQuery")
            })
            .with_technical_asset(TechnicalAsset::new("fn", "Function"))
            .with_shared_runtime(SharedRuntime {
                tags: ids(&["azure"]),
                technical_assets_running: ids(&["fn"]),
                ..SharedRuntime::new("functions", "Functions")
            })
            .build()?;

        let risks = MissingCloudHardeningRule::new().generate_risks(&model)?;
        assert_eq!(
            synthetic_ids(&risks),
            vec!["missing-cloud-hardening@functions@azure", "missing-cloud-hardening@bq@gcp"]
        );
        Ok(())
    }

    #[test]
    fn test_out_of_scope_asset_adds_nothing() -> ThreatloomResult<()> {
        let builder = ModelBuilder::new("scope").with_trust_boundary(TrustBoundary {
            tags: ids(&["aws"]),
            technical_assets_inside: ids(&["web"]),
            ..TrustBoundary::new("vpc", "VPC")
        });
        let baseline = builder
            .clone()
            .with_technical_asset(TechnicalAsset::new("web", "Web"))
            .build()?;
        let extended = builder
            .with_technical_asset(TechnicalAsset::new("web", "Web"))
            .with_technical_asset(TechnicalAsset {
                out_of_scope: true,
                confidentiality: Confidentiality::StrictlyConfidential,
                tags: ids(&["azure", "aws:s3"]),
                ..TechnicalAsset::new("saas", "SaaS")
            })
            .build()?;

        let rule = MissingCloudHardeningRule::new();
        assert_eq!(rule.generate_risks(&baseline)?, rule.generate_risks(&extended)?);
        Ok(())
    }

    #[test]
    fn test_supported_tags() {
        let tags = MissingCloudHardeningRule::new().supported_tags();
        assert_eq!(tags.len(), 14);
        assert_eq!(&tags[..4], &ids(&["aws", "azure", "gcp", "ocp"])[..]);
        assert!(tags.contains(&"aws:iam".to_string()));
    }
}
