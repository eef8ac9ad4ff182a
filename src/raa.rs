//! Relative Attacker Attractiveness (RAA) scoring.
//!
//! Each technical asset gets a raw attractiveness from its own ratings, the
//! data it processes and stores, and the data flowing over its outgoing links.
//! Raw values are normalised into a percentage of the model-wide spread, then
//! in-scope assets with a more attractive outgoing neighbour are lifted by a
//! third of the gap (pivoting factor).

use crate::model::{DataAsset, Model, TechnicalAsset};
use crate::progress::ProgressReporter;
use crate::taxonomy::{TechnicalAssetType, TechnologyAttribute};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// RAA carried by out-of-scope assets
pub const OUT_OF_SCOPE_RAA: f64 = 0.0;

const INTRO_TEXT: &str = "For each technical asset the <b>\"Relative Attacker Attractiveness\"</b> (RAA) value \
was calculated in percent. The higher the RAA, the more interesting it is for an attacker to compromise the asset. \
The calculation takes the sensitivity ratings and quantities of stored and processed data into account as well as \
the communication links of the technical asset. Neighbouring assets of high-value RAA targets receive an increase \
in their RAA value when they have a communication link towards that target (\"Pivoting-Factor\").<br><br>\
The following lists all technical assets sorted by their RAA value from highest (most attacker attractive) to \
lowest. This list can be used to prioritize efforts on the most attacker-attractive technical assets:";

/// Annotate every technical asset with its RAA and return the report intro text
pub fn apply_raa(model: &mut Model, reporter: &dyn ProgressReporter) -> String {
    reporter.info("Applying RAA calculation");

    let raw: BTreeMap<&str, f64> = model
        .technical_assets()
        .values()
        .map(|asset| (asset.id.as_str(), attacker_attractiveness(model, asset)))
        .collect();
    let bounds = Bounds::of(raw.values().copied());

    let scores: BTreeMap<String, f64> = model
        .technical_assets()
        .values()
        .map(|asset| {
            let score = if asset.out_of_scope {
                OUT_OF_SCOPE_RAA
            } else {
                let own = bounds.percent(raw.get(asset.id.as_str()).copied().unwrap_or_default());
                own + pivoting_adjustment(asset, own, &raw, &bounds)
            };
            log::trace!("RAA of '{}' is {:.2}", asset.id, score);
            (asset.id.clone(), score)
        })
        .collect();

    for asset in model.technical_assets_mut() {
        if let Some(score) = scores.get(&asset.id) {
            asset.raa = *score;
        }
    }

    log::debug!("RAA applied to {} technical assets", scores.len());
    INTRO_TEXT.to_string()
}

/// In-scope assets ordered by RAA, most attractive first (ties by id)
pub fn technical_assets_by_raa(model: &Model) -> Vec<&TechnicalAsset> {
    let mut assets: Vec<&TechnicalAsset> = model
        .technical_assets()
        .values()
        .filter(|asset| !asset.out_of_scope)
        .collect();
    assets.sort_by(|a, b| match b.raa.total_cmp(&a.raa) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
    assets
}

/// Unnormalised attractiveness of a single asset
pub fn attacker_attractiveness(model: &Model, asset: &TechnicalAsset) -> f64 {
    if asset.out_of_scope {
        return 0.0;
    }

    let mut score = asset.confidentiality.attacker_attractiveness_for_asset()
        + asset.integrity.attacker_attractiveness_for_asset()
        + asset.availability.attacker_attractiveness_for_asset();

    // stored data counts on top of processed data
    let mut weights: Vec<f64> = model
        .data_assets_of(&asset.data_assets_processed)
        .chain(model.data_assets_of(&asset.data_assets_stored))
        .map(processed_or_stored_weight)
        .collect();
    for link in &asset.communication_links {
        weights.extend(
            model
                .data_assets_of(&link.data_assets_sent)
                .chain(model.data_assets_of(&link.data_assets_received))
                .map(transferred_weight),
        );
    }

    // summed in value order so the result does not depend on list order
    weights.sort_by(f64::total_cmp);
    score += weights.iter().sum::<f64>();

    score = apply_technology_multiplier(asset, score);
    if asset.multi_tenant {
        score *= 1.5;
    }
    score
}

fn processed_or_stored_weight(data: &DataAsset) -> f64 {
    let factor = data.quantity.quantity_factor();
    (data.confidentiality.attacker_attractiveness_for_processed_or_stored_data()
        + data.integrity.attacker_attractiveness_for_processed_or_stored_data())
        * factor
        + data.availability.attacker_attractiveness_for_processed_or_stored_data()
}

fn transferred_weight(data: &DataAsset) -> f64 {
    let factor = data.quantity.quantity_factor();
    (data.confidentiality.attacker_attractiveness_for_in_out_transferred_data()
        + data.integrity.attacker_attractiveness_for_in_out_transferred_data())
        * factor
        + data.availability.attacker_attractiveness_for_in_out_transferred_data()
}

/// First matching technology wins
fn apply_technology_multiplier(asset: &TechnicalAsset, score: f64) -> f64 {
    use TechnologyAttribute::*;

    let technologies = &asset.technologies;
    if technologies.get_attribute(&[LoadBalancer, ReverseProxy]) {
        score / 5.5
    } else if technologies.get_attribute(&[Monitoring]) {
        score / 5.0
    } else if technologies.get_attribute(&[ContainerPlatform]) {
        score * 5.0
    } else if technologies.get_attribute(&[Vault]) {
        score * 2.0
    } else if technologies.get_attribute(&[BuildPipeline, SourcecodeRepository, ArtifactRegistry]) {
        score * 2.0
    } else if technologies.get_attribute(&[IdentityProvider, IdentityStoreDatabase, IdentityStoreLdap]) {
        score * 2.5
    } else if asset.asset_type == TechnicalAssetType::Datastore {
        score * 2.0
    } else {
        score
    }
}

fn pivoting_adjustment(
    asset: &TechnicalAsset,
    own_percent: f64,
    raw: &BTreeMap<&str, f64>,
    bounds: &Bounds,
) -> f64 {
    asset
        .communication_links
        .iter()
        .filter_map(|link| raw.get(link.target_id.as_str()))
        .map(|neighbour| (bounds.percent(*neighbour) - own_percent) / 3.0)
        .fold(0.0, f64::max)
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        let (min, mut max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !(min < max) {
            max = min + 1.0;
        }
        Self { min, max }
    }

    /// Position within the spread in percent, floored to 1
    fn percent(&self, value: f64) -> f64 {
        let percent = (value - self.min) / (self.max - self.min) * 100.0;
        if percent <= 0.0 {
            1.0
        } else {
            percent
        }
    }
}
