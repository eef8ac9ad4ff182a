//! Model loading and JSON risk export for the binary.

use crate::errors::{ThreatloomError, ThreatloomResult};
use crate::model::{Model, ModelBuilder};
use crate::raa::technical_assets_by_raa;
use crate::risks::Risk;
use crate::stats::RiskStatistics;
use serde::Serialize;
use std::path::Path;

/// Read a JSON model description and build it
pub fn load_model(path: &Path) -> ThreatloomResult<Model> {
    log::info!("Reading model from: {:?}", path);
    let content =
        std::fs::read_to_string(path).map_err(|e| ThreatloomError::io(e, path.to_path_buf()))?;
    let builder: ModelBuilder = serde_json::from_str(&content)?;
    builder.build()
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedAsset {
    pub id: String,
    pub title: String,
    pub raa: f64,
}

/// Everything a report renderer consumes from one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport<'a> {
    pub title: &'a str,
    pub raa_intro: &'a str,
    pub raa_ranking: Vec<RankedAsset>,
    pub statistics: RiskStatistics,
    pub risks: &'a [Risk],
}

impl<'a> RiskReport<'a> {
    pub fn new(model: &'a Model, raa_intro: &'a str, risks: &'a [Risk]) -> Self {
        let raa_ranking = technical_assets_by_raa(model)
            .into_iter()
            .map(|asset| RankedAsset {
                id: asset.id.clone(),
                title: asset.title.clone(),
                raa: asset.raa,
            })
            .collect();

        Self {
            title: model.title(),
            raa_intro,
            raa_ranking,
            statistics: RiskStatistics::from_risks(risks),
            risks,
        }
    }

    pub fn write_json(&self, path: &Path) -> ThreatloomResult<()> {
        log::info!("Writing JSON results to: {:?}", path);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| ThreatloomError::io(e, path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::CollectingReporter;
    use crate::{apply_raa, evaluate_rules, list_built_in_rules};
    use tempfile::TempDir;

    const MODEL_JSON: &str = r#"{
        "title": "Shop",
        "data_assets": [
            {"id": "orders", "title": "Orders", "confidentiality": "confidential", "integrity": "critical"}
        ],
        "technical_assets": [
            {"id": "db", "title": "Order DB", "type": "datastore", "data_assets_stored": ["orders"]},
            {"id": "web", "title": "Web Shop", "communication_links": [
                {"id": "web-to-db", "target_id": "db", "data_assets_sent": ["orders"]}
            ]}
        ]
    }"#;

    #[test]
    fn test_load_evaluate_and_export() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let model_path = dir.path().join("model.json");
        std::fs::write(&model_path, MODEL_JSON)?;

        let mut model = load_model(&model_path)?;
        let reporter = CollectingReporter::new();
        let intro = apply_raa(&mut model, &reporter);
        let risks = evaluate_rules(&model, &list_built_in_rules(), &reporter)?;

        let report = RiskReport::new(&model, &intro, &risks);
        assert_eq!(report.raa_ranking[0].id, "db");
        assert_eq!(report.statistics.total, 1);

        let output = dir.path().join("risks.json");
        report.write_json(&output)?;
        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output)?)?;
        assert_eq!(written["title"], "Shop");
        assert_eq!(written["risks"][0]["synthetic_id"], "unencrypted-asset@db");
        Ok(())
    }

    #[test]
    fn test_missing_model_file_reports_path() {
        let result = load_model(Path::new("/nonexistent/threatloom/model.json"));
        assert!(matches!(result, Err(ThreatloomError::Io { path: Some(_), .. })));
    }

    #[test]
    fn test_invalid_reference_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let model_path = dir.path().join("broken.json");
        std::fs::write(
            &model_path,
            r#"{"technical_assets": [{"id": "web", "data_assets_processed": ["ghost"]}]}"#,
        )?;
        assert!(matches!(
            load_model(&model_path),
            Err(ThreatloomError::ModelReference { .. })
        ));
        Ok(())
    }
}
