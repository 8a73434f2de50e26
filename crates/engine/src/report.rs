//! The result of one invocation.

use dtr_core::RuleId;
use dtr_rule::RuleOutput;
use serde::{Deserialize, Serialize};

use crate::journal::JournalEntry;
use crate::status::{InvocationStatus, RuleOutcome};

/// Merged output plus how the invocation ended and what happened on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Every message produced, in execution order.
    pub output: RuleOutput,
    /// Final status: [`Done`](InvocationStatus::Done) or
    /// [`Cancelled`](InvocationStatus::Cancelled).
    pub status: InvocationStatus,
    /// Journal of the invocation.
    pub journal: Vec<JournalEntry>,
}

impl ExecutionReport {
    /// Returns `true` if every applicable rule got to run.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == InvocationStatus::Done
    }

    /// Returns `true` if the invocation stopped on a cancellation request.
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.status == InvocationStatus::Cancelled
    }

    /// Primary rules that started, in order.
    pub fn executed_rules(&self) -> Vec<&RuleId> {
        self.journal
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::RuleStarted { rule, .. } => Some(rule),
                _ => None,
            })
            .collect()
    }

    /// Primary rules that faulted, in order.
    pub fn failed_rules(&self) -> Vec<&RuleId> {
        self.journal
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::RuleFailed { rule, .. } => Some(rule),
                _ => None,
            })
            .collect()
    }

    /// Error handlers that ran, in order.
    pub fn handlers_run(&self) -> Vec<&RuleId> {
        self.journal
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::HandlerStarted { handler, .. } => Some(handler),
                _ => None,
            })
            .collect()
    }

    /// How each primary rule ended, in order: succeeded, failed or skipped.
    ///
    /// Rules that never got to run because of a cancellation are absent.
    pub fn rule_outcomes(&self) -> Vec<(&RuleId, RuleOutcome)> {
        self.journal
            .iter()
            .filter(|entry| !entry.is_handler_event())
            .filter_map(|entry| Some((entry.rule_id()?, entry.outcome()?)))
            .collect()
    }

    /// Consume the report, keeping only the output.
    #[must_use]
    pub fn into_output(self) -> RuleOutput {
        self.output
    }
}
