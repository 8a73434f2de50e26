//! Invocation-level status tracking.

use serde::{Deserialize, Serialize};

/// Where a single rule invocation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    /// Created, no rule has run yet.
    Pending,
    /// A primary rule is running.
    Running,
    /// A rule faulted and its error handlers are running.
    ErrorHandling,
    /// Every applicable rule ran.
    Done,
    /// Stopped early by a cancellation request.
    Cancelled,
}

impl InvocationStatus {
    /// Returns `true` if the invocation has reached a final state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Returns `true` if the invocation is currently doing work.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::ErrorHandling)
    }
}

impl std::fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::ErrorHandling => write!(f, "error_handling"),
            Self::Done => write!(f, "done"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// How a single rule or handler run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    /// The body returned an output.
    Succeeded,
    /// The body returned an error or panicked.
    Failed,
    /// The rule was not eligible for the triggering event.
    Skipped,
}

impl std::fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}
