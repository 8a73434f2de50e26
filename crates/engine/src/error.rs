//! Engine error types.

use dtr_core::RuleId;
use dtr_rule::ConfigurationError;

use crate::status::InvocationStatus;

/// Fatal engine-level errors.
///
/// Rule faults are never reported here; they become messages in the
/// invocation's output.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The rule configuration was rejected at startup.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The graph names a rule that has no registered body.
    #[error("rule {0} appears in the graph but has no registered body")]
    MissingRuleBody(RuleId),

    /// An invocation state transition is not valid.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: InvocationStatus,
        /// Attempted target status.
        to: InvocationStatus,
    },

    /// A batch worker panicked outside any rule body.
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// The invocation was cancelled before it started.
    #[error("invocation cancelled")]
    Cancelled,
}
