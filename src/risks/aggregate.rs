//! Cloud provider buckets used to collapse findings to one representative
//! risk per provider and scope.
//!
//! Scopes (shared runtimes, trust boundaries, technical assets) are sorted
//! into one bucket per provider plus an unspecific bucket. After
//! classification, [`CloudBuckets::subsume`] drops every unspecific entry that
//! a provider-specific bucket already covers.

use crate::model::{Model, TechnicalAsset};
use crate::tags::{is_tagged_with_base_tag, Tagged};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// AWS service tags that warrant their own findings on the tagged asset
pub const AWS_SUB_TAGS: [&str; 10] = [
    "aws:vpc",
    "aws:ec2",
    "aws:s3",
    "aws:ebs",
    "aws:apigateway",
    "aws:lambda",
    "aws:dynamodb",
    "aws:rds",
    "aws:sqs",
    "aws:iam",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
    Ocp,
}

impl CloudProvider {
    pub const ALL: [CloudProvider; 4] = [
        CloudProvider::Aws,
        CloudProvider::Azure,
        CloudProvider::Gcp,
        CloudProvider::Ocp,
    ];

    pub fn base_tag(self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azure",
            CloudProvider::Gcp => "gcp",
            CloudProvider::Ocp => "ocp",
        }
    }

    /// Short name shown in finding titles
    pub fn label(self) -> &'static str {
        match self {
            CloudProvider::Aws => "AWS",
            CloudProvider::Azure => "Azure",
            CloudProvider::Gcp => "GCP",
            CloudProvider::Ocp => "OCP",
        }
    }

    /// Hardening guide recommended for the provider
    pub fn details(self) -> &'static str {
        match self {
            CloudProvider::Aws => "CIS Benchmark for AWS",
            CloudProvider::Azure => "CIS Benchmark for Microsoft Azure",
            CloudProvider::Gcp => "CIS Benchmark for Google Cloud Computing Platform",
            CloudProvider::Ocp => "Vendor Best Practices for Oracle Cloud Platform",
        }
    }

    /// Providers whose base tag occurs in `tags`
    pub fn tagged_in(tags: &[String]) -> impl Iterator<Item = CloudProvider> + '_ {
        Self::ALL
            .into_iter()
            .filter(move |provider| is_tagged_with_base_tag(tags, provider.base_tag()))
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Provider buckets and the unspecific bucket for one kind of scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeBuckets {
    providers: BTreeMap<CloudProvider, BTreeSet<String>>,
    unspecific: BTreeSet<String>,
}

impl ScopeBuckets {
    /// Put `id` into the bucket of every provider tagged in `tags`
    pub fn add_by_tags(&mut self, id: &str, tags: &[String]) {
        for provider in CloudProvider::tagged_in(tags) {
            self.providers
                .entry(provider)
                .or_default()
                .insert(id.to_string());
        }
    }

    pub fn add_unspecific(&mut self, id: &str) {
        self.unspecific.insert(id.to_string());
    }

    pub fn provider(&self, provider: CloudProvider) -> impl Iterator<Item = &str> {
        self.providers
            .get(&provider)
            .into_iter()
            .flat_map(|ids| ids.iter().map(String::as_str))
    }

    pub fn unspecific(&self) -> impl Iterator<Item = &str> {
        self.unspecific.iter().map(String::as_str)
    }

    fn remove_unspecific(&mut self, id: &str) {
        self.unspecific.remove(id);
    }

    fn subsume(&mut self) {
        for ids in self.providers.values() {
            for id in ids {
                self.unspecific.remove(id);
            }
        }
    }
}

/// Classification state of the cloud hardening rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudBuckets {
    pub shared_runtimes: ScopeBuckets,
    pub trust_boundaries: ScopeBuckets,
    pub technical_assets: ScopeBuckets,
    sub_tag_specific: BTreeSet<String>,
}

impl CloudBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify an asset by `tags`, which are its own or those it inherits;
    /// the asset's own AWS sub-tags flag it for service-specific findings
    pub fn add_technical_asset(&mut self, asset: &TechnicalAsset, tags: &[String]) {
        if asset.is_tagged_with_any(&AWS_SUB_TAGS) {
            self.sub_tag_specific.insert(asset.id.clone());
        }
        self.technical_assets.add_by_tags(&asset.id, tags);
    }

    pub fn sub_tag_specific(&self) -> impl Iterator<Item = &str> {
        self.sub_tag_specific.iter().map(String::as_str)
    }

    /// Provider-specific classification wins over the unspecific bucket
    pub fn subsume(&mut self) {
        self.shared_runtimes.subsume();
        self.trust_boundaries.subsume();
        self.technical_assets.subsume();
        for id in &self.sub_tag_specific {
            self.technical_assets.remove_unspecific(id);
        }
    }
}

/// The asset with the highest sensitivity score; ties go to the smallest id
pub fn most_sensitive_technical_asset<'a, 'b>(
    model: &'a Model,
    ids: impl IntoIterator<Item = &'b str>,
) -> Option<&'a TechnicalAsset> {
    let mut most_sensitive: Option<(&TechnicalAsset, f64)> = None;
    for asset in ids.into_iter().filter_map(|id| model.technical_assets().get(id)) {
        let score = model.highest_sensitivity_score(asset);
        let replaces = match most_sensitive {
            None => true,
            Some((best, best_score)) => {
                score > best_score || (score == best_score && asset.id < best.id)
            }
        };
        if replaces {
            most_sensitive = Some((asset, score));
        }
    }
    most_sensitive.map(|(asset, _)| asset)
}
