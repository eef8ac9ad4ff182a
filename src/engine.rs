//! Rule Engine Module
//!
//! Runs every registered rule once against the read-only model, on a rayon
//! pool or sequentially, then validates and orders the combined findings.
//! Results keep registry order before the final sort, so parallel and
//! sequential runs produce the same list.

use crate::errors::{ThreatloomError, ThreatloomResult};
use crate::model::Model;
use crate::progress::ProgressReporter;
use crate::risks::{Risk, RiskRule};
use crate::tags::normalize_tag;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Category ids of rules that are not evaluated
    pub skip_risk_rules: BTreeSet<String>,
    pub parallel: bool,
    /// Worker threads (0 = one per CPU)
    pub threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            skip_risk_rules: BTreeSet::new(),
            parallel: true,
            threads: 0,
        }
    }
}

impl EngineConfig {
    pub fn thread_count(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

/// Cooperative cancellation flag, checked before each rule starts
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum RuleOutcome {
    Evaluated(Vec<Risk>),
    Skipped,
    NotRun,
}

#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    config: EngineConfig,
    cancellation: CancellationToken,
}

impl RuleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate `rules` in registry order and return the sorted findings
    ///
    /// The first failing rule (in registry order) aborts the evaluation;
    /// rules after a failure or a cancellation are not started.
    pub fn evaluate(
        &self,
        model: &Model,
        rules: &[Box<dyn RiskRule>],
        reporter: &dyn ProgressReporter,
    ) -> ThreatloomResult<Vec<Risk>> {
        self.report_unknown_skips(rules, reporter);
        report_unknown_tags(model, rules, reporter);

        let outcomes = if self.config.parallel && rules.len() > 1 {
            self.evaluate_parallel(model, rules, reporter)?
        } else {
            self.evaluate_sequential(model, rules, reporter)?
        };

        let mut risks = Vec::new();
        let mut synthetic_ids = BTreeSet::new();
        for (rule, outcome) in rules.iter().zip(outcomes) {
            let found = match outcome {
                RuleOutcome::Evaluated(found) => found,
                RuleOutcome::Skipped => continue,
                RuleOutcome::NotRun => return Err(ThreatloomError::Cancelled),
            };
            let category_id = rule.category().id;
            for risk in found {
                if risk.category_id != category_id {
                    return Err(ThreatloomError::rule(
                        &category_id,
                        format!("risk '{}' carries category '{}'", risk.synthetic_id, risk.category_id),
                    ));
                }
                if !synthetic_ids.insert(risk.synthetic_id.clone()) {
                    return Err(ThreatloomError::rule(
                        &category_id,
                        format!("duplicate synthetic id '{}'", risk.synthetic_id),
                    ));
                }
                risks.push(risk);
            }
        }

        sort_risks(&mut risks);
        reporter.infof(format_args!("{} risks identified", risks.len()));
        Ok(risks)
    }

    fn evaluate_sequential(
        &self,
        model: &Model,
        rules: &[Box<dyn RiskRule>],
        reporter: &dyn ProgressReporter,
    ) -> ThreatloomResult<Vec<RuleOutcome>> {
        let mut outcomes = Vec::with_capacity(rules.len());
        for rule in rules {
            if self.cancellation.is_cancelled() {
                return Err(ThreatloomError::Cancelled);
            }
            outcomes.push(self.run_rule(model, rule.as_ref(), reporter)?);
        }
        Ok(outcomes)
    }

    fn evaluate_parallel(
        &self,
        model: &Model,
        rules: &[Box<dyn RiskRule>],
        reporter: &dyn ProgressReporter,
    ) -> ThreatloomResult<Vec<RuleOutcome>> {
        let thread_count = self.config.thread_count();
        log::debug!("Evaluating {} rules with {} threads", rules.len(), thread_count);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .map_err(|e| ThreatloomError::ThreadPool(e.to_string()))?;

        // a rule is only abandoned when a rule earlier in the registry failed
        let first_failure = AtomicUsize::new(usize::MAX);
        let results: Vec<ThreatloomResult<RuleOutcome>> = pool.install(|| {
            rules
                .par_iter()
                .enumerate()
                .map(|(index, rule)| {
                    if first_failure.load(Ordering::SeqCst) < index || self.cancellation.is_cancelled() {
                        return Ok(RuleOutcome::NotRun);
                    }
                    let result = self.run_rule(model, rule.as_ref(), reporter);
                    if result.is_err() {
                        first_failure.fetch_min(index, Ordering::SeqCst);
                    }
                    result
                })
                .collect()
        });

        results.into_iter().collect()
    }

    fn run_rule(
        &self,
        model: &Model,
        rule: &dyn RiskRule,
        reporter: &dyn ProgressReporter,
    ) -> ThreatloomResult<RuleOutcome> {
        let category = rule.category();
        if self.config.skip_risk_rules.contains(&category.id) {
            reporter.infof(format_args!("Skipping risk rule {}", category.id));
            return Ok(RuleOutcome::Skipped);
        }

        reporter.infof(format_args!("Executing risk rule {}", category.id));
        let risks = rule.generate_risks(model).map_err(|e| {
            reporter.error(&format!("Risk rule {} failed: {}", category.id, e));
            e
        })?;
        log::debug!("Risk rule {} produced {} risks", category.id, risks.len());
        Ok(RuleOutcome::Evaluated(risks))
    }

    fn report_unknown_skips(&self, rules: &[Box<dyn RiskRule>], reporter: &dyn ProgressReporter) {
        let known: BTreeSet<String> = rules.iter().map(|rule| rule.category().id).collect();
        for id in self.config.skip_risk_rules.difference(&known) {
            reporter.warn(&format!("Unknown risk rule '{}' in skip list", id));
        }
    }
}

/// Warn once about every used tag that is neither declared by the model nor
/// consulted by any rule
fn report_unknown_tags(model: &Model, rules: &[Box<dyn RiskRule>], reporter: &dyn ProgressReporter) {
    let known: BTreeSet<String> = model
        .tags_available()
        .iter()
        .cloned()
        .chain(rules.iter().flat_map(|rule| rule.supported_tags()))
        .map(|tag| normalize_tag(&tag))
        .collect();

    for tag in model.all_used_tags() {
        if !known.contains(&normalize_tag(&tag)) {
            reporter.warn(&format!("Unknown tag '{}' used in model", tag));
        }
    }
}

/// Severity descending, then category id, then synthetic id
pub fn sort_risks(risks: &mut [Risk]) {
    risks.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.category_id.cmp(&b.category_id))
            .then_with(|| a.synthetic_id.cmp(&b.synthetic_id))
    });
}

/// Evaluate with the default engine configuration
pub fn evaluate_rules(
    model: &Model,
    rules: &[Box<dyn RiskRule>],
    reporter: &dyn ProgressReporter,
) -> ThreatloomResult<Vec<Risk>> {
    RuleEngine::default().evaluate(model, rules, reporter)
}
