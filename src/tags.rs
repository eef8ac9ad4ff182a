//! Tag matching and tag inheritance.
//!
//! Tags compare case-insensitively after trimming. A tag such as `aws:ec2`
//! carries the base tag `aws`; a plain `aws` tag carries it as well.
//! Technical assets inherit tags from their enclosing trust boundaries
//! (recursively up to the root) and from the shared runtimes they run on.

use crate::model::{Model, TechnicalAsset, TrustBoundary};

/// Trimmed, lower-cased form tags are compared in
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// True when any entry of `tags` equals any of `wanted` (case-insensitive, trimmed)
pub fn contains_case_insensitive_any(tags: &[String], wanted: &[&str]) -> bool {
    let wanted: Vec<String> = wanted.iter().map(|w| normalize_tag(w)).collect();
    tags.iter().any(|tag| wanted.contains(&normalize_tag(tag)))
}

/// True when any tag is `base` or starts with `base:`
pub fn is_tagged_with_base_tag(tags: &[String], base: &str) -> bool {
    let base = normalize_tag(base);
    let prefix = format!("{}:", base);
    tags.iter().any(|tag| {
        let tag = normalize_tag(tag);
        tag == base || tag.starts_with(&prefix)
    })
}

/// Capability shared by every tag-bearing model entity
pub trait Tagged {
    fn tags(&self) -> &[String];

    fn is_tagged_with_any(&self, wanted: &[&str]) -> bool {
        contains_case_insensitive_any(self.tags(), wanted)
    }

    fn is_tagged_with_base_tag(&self, base: &str) -> bool {
        is_tagged_with_base_tag(self.tags(), base)
    }
}

/// The asset's own tags first, then its trust boundaries (recursively up),
/// then every shared runtime it runs on
pub fn is_technical_asset_tagged_with_any_traversing_up(
    model: &Model,
    asset: &TechnicalAsset,
    wanted: &[&str],
) -> bool {
    if asset.is_tagged_with_any(wanted) {
        return true;
    }
    if let Some(boundary) = model
        .technical_asset_trust_boundary_id(asset)
        .and_then(|id| model.trust_boundaries().get(id))
    {
        if is_trust_boundary_tagged_with_any_traversing_up(model, boundary, wanted) {
            return true;
        }
    }
    model
        .shared_runtimes()
        .values()
        .any(|runtime| runtime.runs(&asset.id) && runtime.is_tagged_with_any(wanted))
}

/// The boundary itself or any of its ancestors carries one of the tags
pub fn is_trust_boundary_tagged_with_any_traversing_up(
    model: &Model,
    boundary: &TrustBoundary,
    wanted: &[&str],
) -> bool {
    let mut current = Some(boundary);
    while let Some(tb) = current {
        if tb.is_tagged_with_any(wanted) {
            return true;
        }
        current = model.find_parent_trust_boundary(tb);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelBuilder, SharedRuntime};
    use crate::ThreatloomResult;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_case_insensitive_match() {
        assert!(contains_case_insensitive_any(&tags(&[" AWS "]), &["aws"]));
        assert!(!contains_case_insensitive_any(&tags(&["aws:ec2"]), &["aws"]));
        assert!(!contains_case_insensitive_any(&[], &["aws"]));
    }

    #[test]
    fn test_base_tag() {
        assert!(is_tagged_with_base_tag(&tags(&["AWS"]), "aws"));
        assert!(is_tagged_with_base_tag(&tags(&["aws:ec2"]), "aws"));
        assert!(is_tagged_with_base_tag(&tags(&["Azure:Functions"]), "azure"));
        assert!(!is_tagged_with_base_tag(&tags(&["awsome"]), "aws"));
        assert!(!is_tagged_with_base_tag(&tags(&["gcp"]), "aws"));
    }

    #[test]
    fn test_traversal_through_nested_boundaries() -> ThreatloomResult<()> {
        let model = ModelBuilder::new("nested")
            .with_technical_asset(TechnicalAsset::new("vm", "VM"))
            .with_trust_boundary(TrustBoundary {
                tags: tags(&["aws:ec2"]),
                trust_boundaries_nested: tags(&["subnet"]),
                ..TrustBoundary::new("vpc", "VPC")
            })
            .with_trust_boundary(TrustBoundary {
                technical_assets_inside: tags(&["vm"]),
                ..TrustBoundary::new("subnet", "Subnet")
            })
            .build()?;

        let vm = model.technical_asset("vm")?;
        assert!(is_technical_asset_tagged_with_any_traversing_up(&model, vm, &["aws:ec2"]));
        assert!(!is_technical_asset_tagged_with_any_traversing_up(&model, vm, &["aws:s3"]));
        Ok(())
    }

    #[test]
    fn test_traversal_through_shared_runtime() -> ThreatloomResult<()> {
        let model = ModelBuilder::new("runtime")
            .with_technical_asset(TechnicalAsset::new("fn", "Function"))
            .with_technical_asset(TechnicalAsset::new("other", "Other"))
            .with_shared_runtime(SharedRuntime {
                tags: tags(&["aws:lambda"]),
                technical_assets_running: tags(&["fn"]),
                ..SharedRuntime::new("lambda-host", "Lambda Host")
            })
            .build()?;

        let function = model.technical_asset("fn")?;
        let other = model.technical_asset("other")?;
        assert!(is_technical_asset_tagged_with_any_traversing_up(&model, function, &["AWS:Lambda"]));
        assert!(!is_technical_asset_tagged_with_any_traversing_up(&model, other, &["aws:lambda"]));
        Ok(())
    }
}
