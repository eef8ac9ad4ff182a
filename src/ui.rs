use crate::model::Model;
use crate::progress::ProgressReporter;
use crate::raa::technical_assets_by_raa;
use crate::risks::{Risk, RiskRule};
use crate::stats::RiskStatistics;
use crate::taxonomy::RiskSeverity;
use console::{style, StyledObject, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Spinner-backed progress reporter for the command line
pub struct TerminalReporter {
    term: Term,
    spinner: ProgressBar,
    start_time: Instant,
}

impl TerminalReporter {
    pub fn new(quiet: bool) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let term = Term::stdout();

        let spinner = if quiet {
            ProgressBar::hidden()
        } else {
            term.hide_cursor()?;
            ProgressBar::new_spinner()
        };

        let spinner_style = ProgressStyle::with_template("{prefix} {spinner:.green} [{elapsed_precise}] {msg}")?
            .tick_strings(&["▰▱▱▱▱", "▰▰▱▱▱", "▰▰▰▱▱", "▰▰▰▰▱", "▰▰▰▰▰", "▱▰▰▰▰"]);
        spinner.set_style(spinner_style);
        spinner.set_prefix(style("⚙ RULES").cyan().bold().to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        Ok(Self {
            term,
            spinner,
            start_time: Instant::now(),
        })
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    pub fn print_rules(&self, rules: &[Box<dyn RiskRule>]) {
        println!();
        for rule in rules {
            let category = rule.category();
            println!(
                "   {} {} {}",
                style("▶").blue(),
                style(&category.id).white().bold(),
                style(format!("({}, CWE-{})", category.stride, category.cwe)).dim()
            );
            println!("     {}", category.title);
        }
        println!();
    }

    pub fn print_summary(&self, model: &Model, risks: &[Risk]) {
        if self.spinner.is_hidden() {
            return;
        }
        let stats = RiskStatistics::from_risks(risks);

        println!();
        println!("{}", style("╔══════════════════════════════════════════════════════════════╗").cyan());
        println!("{}", style("║                       RISK ANALYSIS                         ║").cyan().bold());
        println!("{}", style("╚══════════════════════════════════════════════════════════════╝").cyan());
        println!();

        println!("   {} Model: {}", style("📐").blue(), style(model.title()).white().bold());
        println!(
            "   {} Technical Assets: {}",
            style("🖥").blue(),
            style(model.technical_assets().len()).white().bold()
        );

        if let Some(top) = technical_assets_by_raa(model).first() {
            println!(
                "   {} Most Attractive: {} (RAA {:.0}%)",
                style("🎯").blue(),
                style(&top.title).white().bold(),
                top.raa
            );
        }

        println!("   {} Risks Identified: {}", style("🚨").red(), style(stats.total).red().bold());
        for severity in RiskSeverity::DESCENDING {
            println!(
                "      {} {:<9} {}",
                style("├─").dim(),
                severity_style(severity, severity.to_string()),
                style(stats.count(severity)).white().bold()
            );
        }

        println!(
            "   {} Total Duration: {:.2}s",
            style("⏱️").blue(),
            style(self.elapsed().as_secs_f64()).white().bold()
        );
        println!();
    }
}

fn severity_style(severity: RiskSeverity, text: String) -> StyledObject<String> {
    match severity {
        RiskSeverity::Critical => style(text).red().bold(),
        RiskSeverity::High => style(text).red(),
        RiskSeverity::Elevated => style(text).yellow(),
        RiskSeverity::Medium => style(text).cyan(),
        RiskSeverity::Low => style(text).green(),
    }
}

impl ProgressReporter for TerminalReporter {
    fn info(&self, message: &str) {
        log::debug!("UI: {}", message);
        self.spinner.set_message(message.to_string());
    }

    fn warn(&self, message: &str) {
        log::warn!("{}", message);
        self.spinner
            .println(format!("{} {}", style("⚠").yellow().bold(), style(message).yellow()));
    }

    fn error(&self, message: &str) {
        log::error!("{}", message);
        self.spinner
            .println(format!("{} {}", style("✗").red().bold(), style(message).red()));
    }
}

impl Drop for TerminalReporter {
    fn drop(&mut self) {
        let _ = self.term.show_cursor();
    }
}
