//! Mutable state of one invocation while it runs.

use chrono::Utc;
use dtr_core::RuleId;
use dtr_rule::{ExecutionError, OutputMessage, RuleOutput, Severity};

use crate::journal::JournalEntry;
use crate::report::ExecutionReport;
use crate::status::{InvocationStatus, RuleOutcome};
use crate::transition::validate_transition;

/// Accumulator and state machine for a single invocation.
///
/// Owned by exactly one invocation; never shared.
#[derive(Debug)]
pub(crate) struct Invocation {
    status: InvocationStatus,
    output: RuleOutput,
    journal: Vec<JournalEntry>,
}

impl Invocation {
    pub(crate) fn new() -> Self {
        Self {
            status: InvocationStatus::Pending,
            output: RuleOutput::empty(),
            journal: Vec::new(),
        }
    }

    pub(crate) fn output(&self) -> &RuleOutput {
        &self.output
    }

    fn transition(&mut self, to: InvocationStatus) {
        match validate_transition(self.status, to) {
            Ok(()) => self.status = to,
            Err(err) => tracing::error!(%err, "invocation state machine violated"),
        }
    }

    pub(crate) fn skip(&mut self, rule: &RuleId, reason: impl Into<String>) {
        self.journal.push(JournalEntry::RuleSkipped {
            timestamp: Utc::now(),
            rule: rule.clone(),
            reason: reason.into(),
        });
    }

    pub(crate) fn start(&mut self, rule: &RuleId) {
        self.transition(InvocationStatus::Running);
        self.journal.push(JournalEntry::RuleStarted {
            timestamp: Utc::now(),
            rule: rule.clone(),
        });
    }

    pub(crate) fn succeed(&mut self, rule: &RuleId, output: RuleOutput) {
        self.journal.push(JournalEntry::RuleSucceeded {
            timestamp: Utc::now(),
            rule: rule.clone(),
            messages: output.len(),
        });
        self.output.append(output.attributed_to(rule));
    }

    /// Record a fault and switch to error handling.
    pub(crate) fn fail(&mut self, rule: &RuleId, error: &ExecutionError) {
        self.journal.push(JournalEntry::RuleFailed {
            timestamp: Utc::now(),
            rule: rule.clone(),
            error: error.to_string(),
        });
        self.output.append(fault_message(rule, error));
        self.transition(InvocationStatus::ErrorHandling);
    }

    pub(crate) fn start_handler(&mut self, rule: &RuleId, handler: &RuleId) {
        self.journal.push(JournalEntry::HandlerStarted {
            timestamp: Utc::now(),
            rule: rule.clone(),
            handler: handler.clone(),
        });
    }

    pub(crate) fn finish_handler(
        &mut self,
        rule: &RuleId,
        handler: &RuleId,
        result: Result<RuleOutput, ExecutionError>,
    ) {
        let outcome = match result {
            Ok(output) => {
                self.output.append(output.attributed_to(handler));
                RuleOutcome::Succeeded
            }
            Err(error) => {
                self.output.append(fault_message(handler, &error));
                RuleOutcome::Failed
            }
        };
        self.journal.push(JournalEntry::HandlerFinished {
            timestamp: Utc::now(),
            rule: rule.clone(),
            handler: handler.clone(),
            outcome,
        });
    }

    /// Stop early, keeping everything produced so far.
    pub(crate) fn cancel(mut self, remaining: usize) -> ExecutionReport {
        self.transition(InvocationStatus::Cancelled);
        self.journal.push(JournalEntry::Cancelled {
            timestamp: Utc::now(),
            remaining,
        });
        self.into_report()
    }

    pub(crate) fn finish(mut self) -> ExecutionReport {
        self.transition(InvocationStatus::Done);
        self.into_report()
    }

    fn into_report(mut self) -> ExecutionReport {
        self.journal.push(JournalEntry::Finished {
            timestamp: Utc::now(),
            status: self.status,
            messages: self.output.len(),
        });
        ExecutionReport {
            output: self.output,
            status: self.status,
            journal: self.journal,
        }
    }
}

fn fault_message(rule: &RuleId, error: &ExecutionError) -> RuleOutput {
    RuleOutput::empty().with_message(
        OutputMessage::new(Severity::Error, format!("rule {rule} failed: {error}"))
            .with_rule(rule.clone()),
    )
}
