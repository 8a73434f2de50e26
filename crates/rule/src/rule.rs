//! Executable rule bodies.

use dtr_core::{ElementVisitor, Visitable, VisitableElement};

use crate::error::ExecutionError;
use crate::output::RuleOutput;
use crate::task::{RuleEvent, RuleTask};

/// Everything a rule body sees during one invocation.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Element being processed.
    pub element: &'a VisitableElement,
    /// Task of the invocation.
    pub task: RuleTask,
    /// Lifecycle event that triggered the invocation, if any.
    pub event: Option<RuleEvent>,
    /// Output accumulated by the rules that already ran.
    pub accumulated: &'a RuleOutput,
}

/// The executable part of a rule.
///
/// Returning `Ok` with error-severity messages is an ordinary validation
/// failure. Returning `Err` means the rule itself faulted; the engine records
/// it and runs the rule's error handlers.
pub trait Rule: Send + Sync {
    /// Run the rule against the element in `ctx`.
    fn apply(&self, ctx: &RuleContext<'_>) -> Result<RuleOutput, ExecutionError>;
}

/// Adapts a closure into a [`Rule`].
pub struct FnRule<F>(F);

impl<F> FnRule<F>
where
    F: Fn(&RuleContext<'_>) -> Result<RuleOutput, ExecutionError> + Send + Sync,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&RuleContext<'_>) -> Result<RuleOutput, ExecutionError> + Send + Sync,
{
    fn apply(&self, ctx: &RuleContext<'_>) -> Result<RuleOutput, ExecutionError> {
        (self.0)(ctx)
    }
}

impl<F> std::fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRule").finish_non_exhaustive()
    }
}

/// Adapts an [`ElementVisitor`] into a [`Rule`] by dispatching on the
/// element's variant.
#[derive(Debug)]
pub struct VisitorRule<V>(V);

impl<V> VisitorRule<V>
where
    V: ElementVisitor<Output = Result<RuleOutput, ExecutionError>> + Send + Sync,
{
    /// Wrap `visitor`.
    pub fn new(visitor: V) -> Self {
        Self(visitor)
    }
}

impl<V> Rule for VisitorRule<V>
where
    V: ElementVisitor<Output = Result<RuleOutput, ExecutionError>> + Send + Sync,
{
    fn apply(&self, ctx: &RuleContext<'_>) -> Result<RuleOutput, ExecutionError> {
        ctx.element.accept(&self.0)
    }
}
