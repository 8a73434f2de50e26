//! Invocation state machine transitions.

use crate::error::EngineError;
use crate::status::InvocationStatus;

/// Returns `true` if the transition from `from` to `to` is valid.
///
/// `Running → Running` is the step from one rule to the next.
#[must_use]
pub fn can_transition(from: InvocationStatus, to: InvocationStatus) -> bool {
    use InvocationStatus::{Cancelled, Done, ErrorHandling, Pending, Running};
    matches!(
        (from, to),
        (Pending, Running)
            | (Pending, Done)
            | (Pending, Cancelled)
            | (Running, Running)
            | (Running, ErrorHandling)
            | (Running, Done)
            | (Running, Cancelled)
            | (ErrorHandling, Running)
            | (ErrorHandling, Done)
            | (ErrorHandling, Cancelled)
    )
}

/// Validate a transition, returning an error if invalid.
pub fn validate_transition(from: InvocationStatus, to: InvocationStatus) -> Result<(), EngineError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(EngineError::InvalidTransition { from, to })
    }
}
