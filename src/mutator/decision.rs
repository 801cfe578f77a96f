//! Decisions requested from the caller while removing code

use serde::{Deserialize, Serialize};

/// Answer to "this implementation type is used by several registrations"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiUseChoice {
    Cancel,
    ThisUsageOnly,
    AllUsages,
}

/// Synchronous request/response channel to whoever hosts the edit.
///
/// Returning `None` from [`DecisionProvider::multi_use`] is the same as
/// cancelling.
pub trait DecisionProvider {
    /// Ask before deleting implementation code
    fn confirm(&mut self, message: &str) -> bool;

    /// Ask how to remove code from a type shared by `usages` registrations
    fn multi_use(&mut self, type_name: &str, usages: usize) -> Option<MultiUseChoice>;
}

/// Fixed answers, for non-interactive use and tests
#[derive(Debug, Clone, Copy)]
pub struct Scripted {
    pub confirm: bool,
    pub multi_use: Option<MultiUseChoice>,
}

impl Scripted {
    pub fn new(confirm: bool, multi_use: Option<MultiUseChoice>) -> Self {
        Self { confirm, multi_use }
    }

    /// Confirm everything, never answer the multi-use question
    pub fn yes() -> Self {
        Self::new(true, None)
    }
}

impl DecisionProvider for Scripted {
    fn confirm(&mut self, message: &str) -> bool {
        tracing::debug!("confirm '{}' -> {}", message, self.confirm);
        self.confirm
    }

    fn multi_use(&mut self, type_name: &str, usages: usize) -> Option<MultiUseChoice> {
        tracing::debug!(
            "{} used by {} registrations -> {:?}",
            type_name,
            usages,
            self.multi_use
        );
        self.multi_use
    }
}

/// Records every question asked, answering from a [`Scripted`] script
#[derive(Debug, Clone)]
pub struct Recording {
    pub script: Scripted,
    pub confirmations: Vec<String>,
    pub multi_use_questions: Vec<(String, usize)>,
}

impl Recording {
    pub fn new(script: Scripted) -> Self {
        Self {
            script,
            confirmations: Vec::new(),
            multi_use_questions: Vec::new(),
        }
    }
}

impl DecisionProvider for Recording {
    fn confirm(&mut self, message: &str) -> bool {
        self.confirmations.push(message.to_string());
        self.script.confirm(message)
    }

    fn multi_use(&mut self, type_name: &str, usages: usize) -> Option<MultiUseChoice> {
        self.multi_use_questions.push((type_name.to_string(), usages));
        self.script.multi_use(type_name, usages)
    }
}
