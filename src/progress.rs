//! Progress reporting seam between the analysis core and its host.
//!
//! The core never prints. It reports through a [`ProgressReporter`]; the
//! default [`LogReporter`] forwards to the `log` facade, the binary swaps in
//! the terminal UI.

use std::fmt;
use std::sync::Mutex;

pub trait ProgressReporter: Send + Sync {
    fn info(&self, message: &str);

    fn infof(&self, args: fmt::Arguments<'_>) {
        self.info(&args.to_string());
    }

    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

/// Reporter backed by the `log` macros
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn info(&self, message: &str) {
        log::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        log::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        log::error!("{}", message);
    }
}

/// Reporter that keeps every message, for callers that show them later
#[derive(Debug, Default)]
pub struct CollectingReporter {
    messages: Mutex<Vec<(log::Level, String)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: log::Level, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }

    pub fn messages(&self) -> Vec<(log::Level, String)> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(level, _)| *level == log::Level::Warn)
            .map(|(_, message)| message)
            .collect()
    }
}

impl ProgressReporter for CollectingReporter {
    fn info(&self, message: &str) {
        self.push(log::Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(log::Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(log::Level::Error, message);
    }
}
