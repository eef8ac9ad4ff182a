use crate::engine::EngineConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "threatloom",
    about = "Threatloom - Agile threat modeling: attacker attractiveness scoring and risk rule evaluation",
    version
)]
pub struct Args {
    /// Architecture model as JSON
    #[arg(short, long, required_unless_present = "list_rules")]
    pub model: Option<PathBuf>,

    /// Write identified risks to a JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Risk rule ids to skip
    #[arg(long, value_delimiter = ',')]
    pub skip_rules: Vec<String>,

    /// Number of parallel rule threads (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Evaluate rules one after another on the calling thread
    #[arg(long)]
    pub sequential: bool,

    /// Print the built-in risk rules and exit
    #[arg(long)]
    pub list_rules: bool,

    /// Enable verbose logging of all operations
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide progress output and the summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            skip_risk_rules: self
                .skip_rules
                .iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
            parallel: !self.sequential,
            threads: self.threads,
        }
    }

    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
