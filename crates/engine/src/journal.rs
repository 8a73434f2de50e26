//! Invocation journal for audit and debugging.

use chrono::{DateTime, Utc};
use dtr_core::RuleId;
use serde::{Deserialize, Serialize};

use crate::status::{InvocationStatus, RuleOutcome};

/// A journal entry recording a significant event during one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEntry {
    /// A primary rule started.
    RuleStarted {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The rule that started.
        rule: RuleId,
    },

    /// A primary rule returned an output.
    RuleSucceeded {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The rule that succeeded.
        rule: RuleId,
        /// Number of messages it produced.
        messages: usize,
    },

    /// A primary rule faulted.
    RuleFailed {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The rule that failed.
        rule: RuleId,
        /// Error message.
        error: String,
    },

    /// A primary rule was not run.
    RuleSkipped {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The rule that was skipped.
        rule: RuleId,
        /// Reason for skipping.
        reason: String,
    },

    /// An error handler started.
    HandlerStarted {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The rule whose fault triggered the handler.
        rule: RuleId,
        /// The handler that started.
        handler: RuleId,
    },

    /// An error handler finished.
    HandlerFinished {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The rule whose fault triggered the handler.
        rule: RuleId,
        /// The handler that finished.
        handler: RuleId,
        /// How the handler ended.
        outcome: RuleOutcome,
    },

    /// The invocation stopped on a cancellation request.
    Cancelled {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// Rules that never got to run.
        remaining: usize,
    },

    /// The invocation ended.
    Finished {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// Final status.
        status: InvocationStatus,
        /// Total messages in the merged output.
        messages: usize,
    },
}

impl JournalEntry {
    /// Get the timestamp of this entry.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::RuleStarted { timestamp, .. }
            | Self::RuleSucceeded { timestamp, .. }
            | Self::RuleFailed { timestamp, .. }
            | Self::RuleSkipped { timestamp, .. }
            | Self::HandlerStarted { timestamp, .. }
            | Self::HandlerFinished { timestamp, .. }
            | Self::Cancelled { timestamp, .. }
            | Self::Finished { timestamp, .. } => *timestamp,
        }
    }

    /// The rule this entry is about. For handler entries, the handler.
    #[must_use]
    pub fn rule_id(&self) -> Option<&RuleId> {
        match self {
            Self::RuleStarted { rule, .. }
            | Self::RuleSucceeded { rule, .. }
            | Self::RuleFailed { rule, .. }
            | Self::RuleSkipped { rule, .. } => Some(rule),
            Self::HandlerStarted { handler, .. } | Self::HandlerFinished { handler, .. } => {
                Some(handler)
            }
            Self::Cancelled { .. } | Self::Finished { .. } => None,
        }
    }

    /// Returns `true` if this entry concerns an error handler.
    #[must_use]
    pub fn is_handler_event(&self) -> bool {
        matches!(
            self,
            Self::HandlerStarted { .. } | Self::HandlerFinished { .. }
        )
    }

    /// Returns `true` if this is an invocation-level event.
    #[must_use]
    pub fn is_invocation_event(&self) -> bool {
        self.rule_id().is_none()
    }

    /// How the rule or handler this entry closes ended, if it closes one.
    ///
    /// `RuleSucceeded`, `RuleFailed`, `RuleSkipped` and `HandlerFinished`
    /// are the terminal entries of a rule run; every other entry yields
    /// `None`.
    #[must_use]
    pub fn outcome(&self) -> Option<RuleOutcome> {
        match self {
            Self::RuleSucceeded { .. } => Some(RuleOutcome::Succeeded),
            Self::RuleFailed { .. } => Some(RuleOutcome::Failed),
            Self::RuleSkipped { .. } => Some(RuleOutcome::Skipped),
            Self::HandlerFinished { outcome, .. } => Some(*outcome),
            Self::RuleStarted { .. }
            | Self::HandlerStarted { .. }
            | Self::Cancelled { .. }
            | Self::Finished { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RuleId {
        RuleId::new(s).unwrap()
    }

    #[test]
    fn handler_entries_point_at_the_handler() {
        let entry = JournalEntry::HandlerStarted {
            timestamp: Utc::now(),
            rule: id("main"),
            handler: id("fallback"),
        };
        assert_eq!(entry.rule_id(), Some(&id("fallback")));
        assert!(entry.is_handler_event());
        assert!(!entry.is_invocation_event());
    }

    #[test]
    fn invocation_entries_have_no_rule() {
        let entry = JournalEntry::Finished {
            timestamp: Utc::now(),
            status: InvocationStatus::Done,
            messages: 3,
        };
        assert!(entry.rule_id().is_none());
        assert!(entry.is_invocation_event());
    }

    #[test]
    fn serde_tag_is_snake_case() {
        let entry = JournalEntry::RuleSkipped {
            timestamp: Utc::now(),
            rule: id("r"),
            reason: "not eligible for on_create".into(),
        };
        let value: serde_json::Value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["event"], "rule_skipped");
        assert_eq!(value["rule"], "r");
    }

    #[test]
    fn serde_roundtrip_all_variants() {
        let ts = Utc::now();
        let entries = vec![
            JournalEntry::RuleStarted {
                timestamp: ts,
                rule: id("a"),
            },
            JournalEntry::RuleSucceeded {
                timestamp: ts,
                rule: id("a"),
                messages: 2,
            },
            JournalEntry::RuleFailed {
                timestamp: ts,
                rule: id("b"),
                error: "boom".into(),
            },
            JournalEntry::RuleSkipped {
                timestamp: ts,
                rule: id("c"),
                reason: "event".into(),
            },
            JournalEntry::HandlerStarted {
                timestamp: ts,
                rule: id("b"),
                handler: id("h"),
            },
            JournalEntry::HandlerFinished {
                timestamp: ts,
                rule: id("b"),
                handler: id("h"),
                outcome: RuleOutcome::Succeeded,
            },
            JournalEntry::Cancelled {
                timestamp: ts,
                remaining: 4,
            },
            JournalEntry::Finished {
                timestamp: ts,
                status: InvocationStatus::Cancelled,
                messages: 1,
            },
        ];

        for entry in &entries {
            let json = serde_json::to_string(entry).unwrap();
            let back: JournalEntry = serde_json::from_str(&json).unwrap();
            assert_eq!(&back, entry);
        }
    }

    #[test]
    fn outcomes_of_terminal_entries() {
        let ts = Utc::now();
        let failed = JournalEntry::RuleFailed {
            timestamp: ts,
            rule: id("a"),
            error: "boom".into(),
        };
        let skipped = JournalEntry::RuleSkipped {
            timestamp: ts,
            rule: id("b"),
            reason: "event".into(),
        };
        let started = JournalEntry::RuleStarted {
            timestamp: ts,
            rule: id("a"),
        };
        assert_eq!(failed.outcome(), Some(RuleOutcome::Failed));
        assert_eq!(skipped.outcome(), Some(RuleOutcome::Skipped));
        assert_eq!(started.outcome(), None);
    }
}
