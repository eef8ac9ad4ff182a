//! Threatloom
//!
//! Risk-analysis core for agile threat modeling: relative attacker
//! attractiveness (RAA) scoring of technical assets and a deterministic,
//! parallel risk rule engine over an architecture model.

pub mod cli;
pub mod engine;
pub mod errors;
pub mod exporter;
pub mod model;
pub mod progress;
pub mod raa;
pub mod risks;
pub mod stats;
pub mod tags;
pub mod taxonomy;
pub mod ui;

pub use engine::{evaluate_rules, CancellationToken, EngineConfig, RuleEngine};
pub use errors::{ThreatloomError, ThreatloomResult};
pub use model::{Model, ModelBuilder};
pub use progress::{LogReporter, ProgressReporter};
pub use raa::{apply_raa, technical_assets_by_raa};
pub use risks::{list_built_in_rules, Risk, RiskCategory, RiskRule, RiskScope};
pub use stats::RiskStatistics;
