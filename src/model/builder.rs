//! Model construction and integrity checks.
//!
//! The builder is the loader-facing side of the model: it accepts entities in
//! any order (programmatically or deserialized from JSON), validates every
//! cross reference and derives the containment indexes.

use super::{DataAsset, Model, SharedRuntime, TechnicalAsset, TrustBoundary};
use crate::errors::{ThreatloomError, ThreatloomResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Joins the parts of a synthetic risk id, so entity ids may not contain it
pub const ID_SEPARATOR: char = '@';

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelBuilder {
    pub title: String,
    pub tags_available: Vec<String>,
    pub technical_assets: Vec<TechnicalAsset>,
    pub data_assets: Vec<DataAsset>,
    pub trust_boundaries: Vec<TrustBoundary>,
    pub shared_runtimes: Vec<SharedRuntime>,
}

impl ModelBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_technical_asset(mut self, asset: TechnicalAsset) -> Self {
        self.technical_assets.push(asset);
        self
    }

    pub fn with_data_asset(mut self, data: DataAsset) -> Self {
        self.data_assets.push(data);
        self
    }

    pub fn with_trust_boundary(mut self, boundary: TrustBoundary) -> Self {
        self.trust_boundaries.push(boundary);
        self
    }

    pub fn with_shared_runtime(mut self, runtime: SharedRuntime) -> Self {
        self.shared_runtimes.push(runtime);
        self
    }

    pub fn with_tags_available<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags_available.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Validate references and derive containment; the result is the only way
    /// to obtain a [`Model`]
    pub fn build(self) -> ThreatloomResult<Model> {
        log::debug!(
            "Building model '{}' with {} technical assets, {} data assets, {} trust boundaries, {} shared runtimes",
            self.title,
            self.technical_assets.len(),
            self.data_assets.len(),
            self.trust_boundaries.len(),
            self.shared_runtimes.len()
        );

        let mut all_ids = BTreeSet::new();
        let technical_assets = index("technical asset", self.technical_assets, |a| &a.id, &mut all_ids)?;
        let data_assets = index("data asset", self.data_assets, |d| &d.id, &mut all_ids)?;
        let mut trust_boundaries =
            index("trust boundary", self.trust_boundaries, |tb| &tb.id, &mut all_ids)?;
        let shared_runtimes = index("shared runtime", self.shared_runtimes, |sr| &sr.id, &mut all_ids)?;

        for asset in technical_assets.values() {
            let data_ids = asset
                .data_assets_processed
                .iter()
                .chain(&asset.data_assets_stored);
            require_all("data asset", data_ids, &data_assets, &asset.id)?;

            for link in &asset.communication_links {
                let referenced_by = format!("{}>{}", asset.id, link.id);
                if !technical_assets.contains_key(&link.target_id) {
                    return Err(ThreatloomError::model_reference(
                        "technical asset",
                        &link.target_id,
                        referenced_by,
                    ));
                }
                let payload = link.data_assets_sent.iter().chain(&link.data_assets_received);
                require_all("data asset", payload, &data_assets, &referenced_by)?;
            }
        }

        for boundary in trust_boundaries.values() {
            require_all("technical asset", &boundary.technical_assets_inside, &technical_assets, &boundary.id)?;
            require_all("trust boundary", &boundary.trust_boundaries_nested, &trust_boundaries, &boundary.id)?;
        }

        for runtime in shared_runtimes.values() {
            require_all(
                "technical asset",
                &runtime.technical_assets_running,
                &technical_assets,
                &runtime.id,
            )?;
        }

        let trust_boundary_by_asset = derive_asset_containment(&trust_boundaries)?;
        let parents = derive_parents(&trust_boundaries)?;
        for boundary in trust_boundaries.values_mut() {
            boundary.parent = parents.get(&boundary.id).cloned();
        }
        reject_cycles(&trust_boundaries)?;

        let mut model = Model {
            title: self.title,
            technical_assets,
            data_assets,
            trust_boundaries,
            shared_runtimes,
            tags_available: self.tags_available.into_iter().collect(),
            trust_boundary_by_asset,
        };
        for asset in model.technical_assets_mut() {
            asset.raa = 0.0;
        }

        log::debug!("Model '{}' built", model.title);
        Ok(model)
    }
}

fn index<T>(
    kind: &'static str,
    entities: Vec<T>,
    id_of: impl Fn(&T) -> &String,
    all_ids: &mut BTreeSet<String>,
) -> ThreatloomResult<BTreeMap<String, T>> {
    let mut indexed = BTreeMap::new();
    for entity in entities {
        let id = id_of(&entity).clone();
        if id.contains(ID_SEPARATOR) {
            return Err(ThreatloomError::ReservedIdCharacter {
                kind,
                id,
                reserved: ID_SEPARATOR,
            });
        }
        if !all_ids.insert(id.clone()) {
            return Err(ThreatloomError::DuplicateId { kind, id });
        }
        indexed.insert(id, entity);
    }
    Ok(indexed)
}

fn require_all<'a, T>(
    kind: &'static str,
    ids: impl IntoIterator<Item = &'a String>,
    known: &BTreeMap<String, T>,
    referenced_by: &str,
) -> ThreatloomResult<()> {
    for id in ids {
        if !known.contains_key(id) {
            return Err(ThreatloomError::model_reference(kind, id, referenced_by));
        }
    }
    Ok(())
}

fn derive_asset_containment(
    trust_boundaries: &BTreeMap<String, TrustBoundary>,
) -> ThreatloomResult<BTreeMap<String, String>> {
    let mut containment: BTreeMap<String, String> = BTreeMap::new();
    for boundary in trust_boundaries.values() {
        for asset_id in &boundary.technical_assets_inside {
            if let Some(previous) = containment.insert(asset_id.clone(), boundary.id.clone()) {
                if previous != boundary.id {
                    return Err(ThreatloomError::nesting(
                        asset_id,
                        format!("inside both '{}' and '{}'", previous, boundary.id),
                    ));
                }
            }
        }
    }
    Ok(containment)
}

fn derive_parents(
    trust_boundaries: &BTreeMap<String, TrustBoundary>,
) -> ThreatloomResult<BTreeMap<String, String>> {
    let mut parents: BTreeMap<String, String> = BTreeMap::new();
    for boundary in trust_boundaries.values() {
        for nested in &boundary.trust_boundaries_nested {
            if *nested == boundary.id {
                return Err(ThreatloomError::nesting(nested, "nested in itself"));
            }
            if let Some(previous) = parents.insert(nested.clone(), boundary.id.clone()) {
                if previous != boundary.id {
                    return Err(ThreatloomError::nesting(
                        nested,
                        format!("nested in both '{}' and '{}'", previous, boundary.id),
                    ));
                }
            }
        }
    }
    Ok(parents)
}

fn reject_cycles(trust_boundaries: &BTreeMap<String, TrustBoundary>) -> ThreatloomResult<()> {
    for start in trust_boundaries.values() {
        let mut seen = BTreeSet::new();
        let mut current = Some(start);
        while let Some(boundary) = current {
            if !seen.insert(boundary.id.as_str()) {
                return Err(ThreatloomError::nesting(&start.id, "nesting cycle"));
            }
            current = boundary
                .parent
                .as_deref()
                .and_then(|parent| trust_boundaries.get(parent));
        }
    }
    Ok(())
}
