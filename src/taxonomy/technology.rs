//! Asset types, technology attributes and trust boundary types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of a technical asset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TechnicalAssetType {
    ExternalEntity,
    #[default]
    Process,
    Datastore,
}

impl fmt::Display for TechnicalAssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TechnicalAssetType::ExternalEntity => write!(f, "external-entity"),
            TechnicalAssetType::Process => write!(f, "process"),
            TechnicalAssetType::Datastore => write!(f, "datastore"),
        }
    }
}

/// Typed attribute a technology contributes to a technical asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TechnologyAttribute {
    LoadBalancer,
    ReverseProxy,
    Monitoring,
    ContainerPlatform,
    Vault,
    BuildPipeline,
    SourcecodeRepository,
    ArtifactRegistry,
    IdentityProvider,
    IdentityStoreDatabase,
    IdentityStoreLdap,
    Waf,
    Ids,
    Ips,
    Library,
    IsUsuallyStoringEndUserData,
    IsNoStorageAtRest,
    IsEmbeddedComponent,
}

impl fmt::Display for TechnologyAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TechnologyAttribute::LoadBalancer => "load-balancer",
            TechnologyAttribute::ReverseProxy => "reverse-proxy",
            TechnologyAttribute::Monitoring => "monitoring",
            TechnologyAttribute::ContainerPlatform => "container-platform",
            TechnologyAttribute::Vault => "vault",
            TechnologyAttribute::BuildPipeline => "build-pipeline",
            TechnologyAttribute::SourcecodeRepository => "sourcecode-repository",
            TechnologyAttribute::ArtifactRegistry => "artifact-registry",
            TechnologyAttribute::IdentityProvider => "identity-provider",
            TechnologyAttribute::IdentityStoreDatabase => "identity-store-database",
            TechnologyAttribute::IdentityStoreLdap => "identity-store-ldap",
            TechnologyAttribute::Waf => "waf",
            TechnologyAttribute::Ids => "ids",
            TechnologyAttribute::Ips => "ips",
            TechnologyAttribute::Library => "library",
            TechnologyAttribute::IsUsuallyStoringEndUserData => "is-usually-storing-end-user-data",
            TechnologyAttribute::IsNoStorageAtRest => "is-no-storage-at-rest",
            TechnologyAttribute::IsEmbeddedComponent => "is-embedded-component",
        };
        write!(f, "{}", name)
    }
}

/// Set of technology attributes carried by a technical asset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Technologies(BTreeSet<TechnologyAttribute>);

impl Technologies {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when any of the given attributes is present
    pub fn get_attribute(&self, attributes: &[TechnologyAttribute]) -> bool {
        attributes.iter().any(|a| self.0.contains(a))
    }

    pub fn insert(&mut self, attribute: TechnologyAttribute) {
        self.0.insert(attribute);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TechnologyAttribute> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<TechnologyAttribute> for Technologies {
    fn from_iter<T: IntoIterator<Item = TechnologyAttribute>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[TechnologyAttribute; N]> for Technologies {
    fn from(attributes: [TechnologyAttribute; N]) -> Self {
        attributes.into_iter().collect()
    }
}

/// Kind of a trust boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrustBoundaryType {
    #[default]
    NetworkOnPrem,
    NetworkDedicatedHoster,
    NetworkVirtualLan,
    NetworkCloudProvider,
    NetworkCloudSecurityGroup,
    NetworkPolicyNamespaceIsolation,
    ExecutionEnvironment,
}

impl TrustBoundaryType {
    /// Boundaries realised by a cloud provider's execution environment
    pub fn is_within_cloud(self) -> bool {
        matches!(
            self,
            TrustBoundaryType::NetworkCloudProvider | TrustBoundaryType::NetworkCloudSecurityGroup
        )
    }
}

impl fmt::Display for TrustBoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustBoundaryType::NetworkOnPrem => write!(f, "network-on-prem"),
            TrustBoundaryType::NetworkDedicatedHoster => write!(f, "network-dedicated-hoster"),
            TrustBoundaryType::NetworkVirtualLan => write!(f, "network-virtual-lan"),
            TrustBoundaryType::NetworkCloudProvider => write!(f, "network-cloud-provider"),
            TrustBoundaryType::NetworkCloudSecurityGroup => write!(f, "network-cloud-security-group"),
            TrustBoundaryType::NetworkPolicyNamespaceIsolation => {
                write!(f, "network-policy-namespace-isolation")
            }
            TrustBoundaryType::ExecutionEnvironment => write!(f, "execution-environment"),
        }
    }
}
