//! Rule configuration and execution error types.

use dtr_core::{ElementKind, RuleId};
use thiserror::Error;

use crate::task::RuleTask;

/// Which declaration field a reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `depends_on`
    DependsOn,
    /// `execute_before`
    ExecuteBefore,
    /// `on_error`
    OnError,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DependsOn => write!(f, "depends_on"),
            Self::ExecuteBefore => write!(f, "execute_before"),
            Self::OnError => write!(f, "on_error"),
        }
    }
}

/// The ordering a cycle was found in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphScope {
    /// The primary order of a (task, kind) pair.
    Primary {
        /// Task being ordered.
        task: RuleTask,
        /// Kind being ordered.
        kind: ElementKind,
    },
    /// The error-handler sub-order of a rule.
    ErrorHandlers {
        /// Rule whose handlers are being ordered.
        rule: RuleId,
    },
}

impl std::fmt::Display for GraphScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary { task, kind } => write!(f, "task {task} on {kind}"),
            Self::ErrorHandlers { rule } => write!(f, "error handlers of {rule}"),
        }
    }
}

/// A single problem found while validating the rule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigProblem {
    /// Two declarations share a name.
    #[error("duplicate rule name: {0}")]
    DuplicateRule(RuleId),

    /// A declaration references a rule that was never registered.
    #[error("rule {rule} references unknown rule {target} in {relation}")]
    UnknownReference {
        /// Declaring rule.
        rule: RuleId,
        /// Field containing the reference.
        relation: Relation,
        /// Missing rule.
        target: RuleId,
    },

    /// A declaration references itself.
    #[error("rule {rule} references itself in {relation}")]
    SelfReference {
        /// Declaring rule.
        rule: RuleId,
        /// Field containing the reference.
        relation: Relation,
    },

    /// A declaration targets no element kind.
    #[error("rule {0} does not apply to any element kind")]
    EmptyAppliesTo(RuleId),

    /// A declaration serves no task.
    #[error("rule {0} does not serve any task")]
    NoTasks(RuleId),

    /// Ordering constraints form a cycle.
    #[error("cycle detected in {scope}: {}", format_rules(.rules))]
    Cycle {
        /// Ordering in which the cycle was found.
        scope: GraphScope,
        /// Every rule on the cycle, in lexical order.
        rules: Vec<RuleId>,
    },
}

fn format_rules(rules: &[RuleId]) -> String {
    rules
        .iter()
        .map(RuleId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fatal, build-time failure listing every configuration problem found.
///
/// Raised by [`RuleRegistry::finalize`](crate::RuleRegistry::finalize) and by
/// the graph builder. A process that gets one must not start serving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid rule configuration ({} problem(s)):\n{}", .problems.len(), format_problems(.problems))]
pub struct ConfigurationError {
    problems: Vec<ConfigProblem>,
}

fn format_problems(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ConfigurationError {
    /// Wrap a non-empty list of problems.
    ///
    /// Returns `None` when `problems` is empty.
    #[must_use]
    pub fn from_problems(problems: Vec<ConfigProblem>) -> Option<Self> {
        if problems.is_empty() {
            None
        } else {
            Some(Self { problems })
        }
    }

    /// Every problem found, in detection order.
    pub fn problems(&self) -> &[ConfigProblem] {
        &self.problems
    }

    /// Returns `true` if any problem mentions `rule`.
    pub fn mentions(&self, rule: &str) -> bool {
        self.problems.iter().any(|p| match p {
            ConfigProblem::DuplicateRule(r)
            | ConfigProblem::EmptyAppliesTo(r)
            | ConfigProblem::NoTasks(r)
            | ConfigProblem::SelfReference { rule: r, .. } => r == rule,
            ConfigProblem::UnknownReference {
                rule: r, target, ..
            } => r == rule || target == rule,
            ConfigProblem::Cycle { rules, .. } => rules.iter().any(|r| r == rule),
        })
    }
}

/// A fault raised by a rule body while it runs.
///
/// This is not a validation failure: an element that breaks a rule is
/// reported through the rule's output. An `ExecutionError` means the rule
/// itself could not do its job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Generic fault with a message.
    #[error("{0}")]
    Fault(String),

    /// The element refers to something the rule needs but cannot resolve.
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// The rule was invoked on an element it cannot handle.
    #[error("unsupported element kind: {0}")]
    Unsupported(ElementKind),

    /// The rule body panicked.
    #[error("rule panicked: {0}")]
    Panicked(String),
}

impl ExecutionError {
    /// Create a generic fault.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(message.into())
    }
}
