//! Model Module - In-memory architecture model
//!
//! Entities live in id-keyed arenas (`BTreeMap`, so every walk over a map
//! is in sorted key order). Cross references are plain ids resolved through
//! the [`Model`]. A model only comes out of [`ModelBuilder::build`], which
//! guarantees that every referenced id exists; the RAA pass is the only
//! writer afterwards.

mod builder;
mod entities;

pub use builder::{ModelBuilder, ID_SEPARATOR};
pub use entities::{CommunicationLink, DataAsset, SharedRuntime, TechnicalAsset, TrustBoundary};

use crate::errors::{ThreatloomError, ThreatloomResult};
use crate::tags::Tagged;
use crate::taxonomy::{Confidentiality, Criticality};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Model {
    title: String,
    technical_assets: BTreeMap<String, TechnicalAsset>,
    data_assets: BTreeMap<String, DataAsset>,
    trust_boundaries: BTreeMap<String, TrustBoundary>,
    shared_runtimes: BTreeMap<String, SharedRuntime>,
    tags_available: BTreeSet<String>,
    #[serde(skip)]
    trust_boundary_by_asset: BTreeMap<String, String>,
}

impl Model {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn technical_assets(&self) -> &BTreeMap<String, TechnicalAsset> {
        &self.technical_assets
    }

    pub(crate) fn technical_assets_mut(&mut self) -> impl Iterator<Item = &mut TechnicalAsset> {
        self.technical_assets.values_mut()
    }

    pub fn data_assets(&self) -> &BTreeMap<String, DataAsset> {
        &self.data_assets
    }

    pub fn trust_boundaries(&self) -> &BTreeMap<String, TrustBoundary> {
        &self.trust_boundaries
    }

    pub fn shared_runtimes(&self) -> &BTreeMap<String, SharedRuntime> {
        &self.shared_runtimes
    }

    /// Tags declared by the model author
    pub fn tags_available(&self) -> &BTreeSet<String> {
        &self.tags_available
    }

    pub fn technical_asset(&self, id: &str) -> ThreatloomResult<&TechnicalAsset> {
        self.technical_assets
            .get(id)
            .ok_or_else(|| ThreatloomError::model_reference("technical asset", id, &self.title))
    }

    pub fn data_asset(&self, id: &str) -> ThreatloomResult<&DataAsset> {
        self.data_assets
            .get(id)
            .ok_or_else(|| ThreatloomError::model_reference("data asset", id, &self.title))
    }

    pub fn trust_boundary(&self, id: &str) -> ThreatloomResult<&TrustBoundary> {
        self.trust_boundaries
            .get(id)
            .ok_or_else(|| ThreatloomError::model_reference("trust boundary", id, &self.title))
    }

    pub fn shared_runtime(&self, id: &str) -> ThreatloomResult<&SharedRuntime> {
        self.shared_runtimes
            .get(id)
            .ok_or_else(|| ThreatloomError::model_reference("shared runtime", id, &self.title))
    }

    pub fn sorted_technical_asset_ids(&self) -> Vec<&str> {
        self.technical_assets.keys().map(String::as_str).collect()
    }

    /// Data assets behind a list of ids, skipping none on a built model
    pub fn data_assets_of<'a>(&'a self, ids: &'a [String]) -> impl Iterator<Item = &'a DataAsset> + 'a {
        ids.iter().filter_map(move |id| self.data_assets.get(id))
    }

    /// Every asset inside the boundary or any boundary nested in it, sorted
    pub fn recursively_all_technical_asset_ids_inside(&self, boundary: &TrustBoundary) -> Vec<String> {
        let mut ids = BTreeSet::new();
        let mut pending = vec![boundary];
        while let Some(tb) = pending.pop() {
            ids.extend(tb.technical_assets_inside.iter().cloned());
            pending.extend(
                tb.trust_boundaries_nested
                    .iter()
                    .filter_map(|nested| self.trust_boundaries.get(nested)),
            );
        }
        ids.into_iter().collect()
    }

    pub fn find_parent_trust_boundary(&self, boundary: &TrustBoundary) -> Option<&TrustBoundary> {
        boundary
            .parent
            .as_deref()
            .and_then(|id| self.trust_boundaries.get(id))
    }

    /// Id of the boundary directly enclosing the asset
    pub fn technical_asset_trust_boundary_id(&self, asset: &TechnicalAsset) -> Option<&str> {
        self.trust_boundary_by_asset.get(&asset.id).map(String::as_str)
    }

    pub fn technical_assets_tagged_with_any(&self, tags: &[&str]) -> Vec<&TechnicalAsset> {
        self.technical_assets
            .values()
            .filter(|asset| asset.is_tagged_with_any(tags))
            .collect()
    }

    pub fn trust_boundaries_tagged_with_any(&self, tags: &[&str]) -> Vec<&TrustBoundary> {
        self.trust_boundaries
            .values()
            .filter(|boundary| boundary.is_tagged_with_any(tags))
            .collect()
    }

    pub fn shared_runtimes_running(&self, asset: &TechnicalAsset) -> Vec<&SharedRuntime> {
        self.shared_runtimes
            .values()
            .filter(|runtime| runtime.runs(&asset.id))
            .collect()
    }

    /// Every distinct tag used on any entity of the model
    pub fn all_used_tags(&self) -> BTreeSet<String> {
        let mut used = BTreeSet::new();
        for asset in self.technical_assets.values() {
            used.extend(asset.tags.iter().cloned());
            for link in &asset.communication_links {
                used.extend(link.tags.iter().cloned());
            }
        }
        for data in self.data_assets.values() {
            used.extend(data.tags.iter().cloned());
        }
        for boundary in self.trust_boundaries.values() {
            used.extend(boundary.tags.iter().cloned());
        }
        for runtime in self.shared_runtimes.values() {
            used.extend(runtime.tags.iter().cloned());
        }
        used
    }

    pub fn highest_stored_confidentiality(&self, asset: &TechnicalAsset) -> Confidentiality {
        self.data_assets_of(&asset.data_assets_stored)
            .map(|data| data.confidentiality)
            .fold(asset.confidentiality, std::cmp::max)
    }

    pub fn highest_stored_integrity(&self, asset: &TechnicalAsset) -> Criticality {
        self.data_assets_of(&asset.data_assets_stored)
            .map(|data| data.integrity)
            .fold(asset.integrity, std::cmp::max)
    }

    pub fn highest_processed_confidentiality(&self, asset: &TechnicalAsset) -> Confidentiality {
        self.data_assets_of(&asset.data_assets_processed)
            .map(|data| data.confidentiality)
            .fold(asset.confidentiality, std::cmp::max)
    }

    pub fn highest_processed_integrity(&self, asset: &TechnicalAsset) -> Criticality {
        self.data_assets_of(&asset.data_assets_processed)
            .map(|data| data.integrity)
            .fold(asset.integrity, std::cmp::max)
    }

    pub fn highest_processed_availability(&self, asset: &TechnicalAsset) -> Criticality {
        self.data_assets_of(&asset.data_assets_processed)
            .map(|data| data.availability)
            .fold(asset.availability, std::cmp::max)
    }

    /// Asset weight of the highest C, I and A found on the asset itself or on
    /// any data it processes or stores
    pub fn highest_sensitivity_score(&self, asset: &TechnicalAsset) -> f64 {
        let data: Vec<&DataAsset> = self
            .data_assets_of(&asset.data_assets_processed)
            .chain(self.data_assets_of(&asset.data_assets_stored))
            .collect();
        let confidentiality = data
            .iter()
            .map(|d| d.confidentiality)
            .fold(asset.confidentiality, std::cmp::max);
        let integrity = data.iter().map(|d| d.integrity).fold(asset.integrity, std::cmp::max);
        let availability = data
            .iter()
            .map(|d| d.availability)
            .fold(asset.availability, std::cmp::max);

        confidentiality.attacker_attractiveness_for_asset()
            + integrity.attacker_attractiveness_for_asset()
            + availability.attacker_attractiveness_for_asset()
    }

    /// In-scope assets behind a list of ids; the scope-wide maxima below skip
    /// out-of-scope members
    pub fn in_scope_technical_assets<'a>(
        &'a self,
        ids: &'a [String],
    ) -> impl Iterator<Item = &'a TechnicalAsset> + 'a {
        ids.iter()
            .filter_map(move |id| self.technical_assets.get(id))
            .filter(|asset| !asset.out_of_scope)
    }

    pub fn find_trust_boundary_highest_confidentiality(&self, boundary: &TrustBoundary) -> Confidentiality {
        let ids = self.recursively_all_technical_asset_ids_inside(boundary);
        self.in_scope_technical_assets(&ids)
            .map(|asset| self.highest_processed_confidentiality(asset))
            .fold(Confidentiality::Public, std::cmp::max)
    }

    pub fn find_trust_boundary_highest_integrity(&self, boundary: &TrustBoundary) -> Criticality {
        let ids = self.recursively_all_technical_asset_ids_inside(boundary);
        self.in_scope_technical_assets(&ids)
            .map(|asset| self.highest_processed_integrity(asset))
            .fold(Criticality::Archive, std::cmp::max)
    }

    pub fn find_trust_boundary_highest_availability(&self, boundary: &TrustBoundary) -> Criticality {
        let ids = self.recursively_all_technical_asset_ids_inside(boundary);
        self.in_scope_technical_assets(&ids)
            .map(|asset| self.highest_processed_availability(asset))
            .fold(Criticality::Archive, std::cmp::max)
    }

    pub fn find_shared_runtime_highest_confidentiality(&self, runtime: &SharedRuntime) -> Confidentiality {
        self.in_scope_technical_assets(&runtime.technical_assets_running)
            .map(|asset| self.highest_processed_confidentiality(asset))
            .fold(Confidentiality::Public, std::cmp::max)
    }

    pub fn find_shared_runtime_highest_integrity(&self, runtime: &SharedRuntime) -> Criticality {
        self.in_scope_technical_assets(&runtime.technical_assets_running)
            .map(|asset| self.highest_processed_integrity(asset))
            .fold(Criticality::Archive, std::cmp::max)
    }

    pub fn find_shared_runtime_highest_availability(&self, runtime: &SharedRuntime) -> Criticality {
        self.in_scope_technical_assets(&runtime.technical_assets_running)
            .map(|asset| self.highest_processed_availability(asset))
            .fold(Criticality::Archive, std::cmp::max)
    }
}
