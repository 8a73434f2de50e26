//! Declared facts about a single rule.

use std::collections::BTreeSet;

use dtr_core::{ElementKind, RuleId};
use serde::{Deserialize, Serialize};

use crate::task::{RuleEvent, RuleTask};

fn default_tasks() -> BTreeSet<RuleTask> {
    BTreeSet::from([RuleTask::Validate])
}

/// Immutable description of a rule: what it targets, when it is eligible and
/// how it is ordered relative to other rules.
///
/// Built fluently and handed to [`RuleRegistry::register`](crate::RuleRegistry::register);
/// it is never modified afterwards. All sets are ordered so that every
/// traversal of a declaration is deterministic.
///
/// ```
/// use dtr_core::ElementKind;
/// use dtr_rule::{RuleDeclaration, RuleEvent};
///
/// let declaration = RuleDeclaration::new("profile.unique-attribute-names")
///     .unwrap()
///     .describe("attribute names are unique within a profile")
///     .applies_to([ElementKind::TypeProfile])
///     .on_events([RuleEvent::OnCreate, RuleEvent::OnUpdate]);
/// assert!(declaration.is_eligible(Some(RuleEvent::OnCreate)));
/// assert!(!declaration.is_eligible(None));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDeclaration {
    name: RuleId,
    #[serde(default)]
    description: String,
    #[serde(default)]
    applies_to: BTreeSet<ElementKind>,
    #[serde(default = "default_tasks")]
    tasks: BTreeSet<RuleTask>,
    #[serde(default)]
    depends_on: BTreeSet<RuleId>,
    #[serde(default)]
    execute_before: BTreeSet<RuleId>,
    #[serde(default)]
    on_error: BTreeSet<RuleId>,
    #[serde(default)]
    execute_on_event: BTreeSet<RuleEvent>,
}

impl RuleDeclaration {
    /// Start a declaration for the rule `name`, serving [`RuleTask::Validate`].
    pub fn new(name: &str) -> Result<Self, dtr_core::RuleIdError> {
        Ok(Self::with_id(RuleId::new(name)?))
    }

    /// Start a declaration from an already validated id.
    #[must_use]
    pub fn with_id(name: RuleId) -> Self {
        Self {
            name,
            description: String::new(),
            applies_to: BTreeSet::new(),
            tasks: default_tasks(),
            depends_on: BTreeSet::new(),
            execute_before: BTreeSet::new(),
            on_error: BTreeSet::new(),
            execute_on_event: BTreeSet::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add element kinds this rule targets.
    #[must_use]
    pub fn applies_to(mut self, kinds: impl IntoIterator<Item = ElementKind>) -> Self {
        self.applies_to.extend(kinds);
        self
    }

    /// Replace the tasks this rule serves.
    #[must_use]
    pub fn tasks(mut self, tasks: impl IntoIterator<Item = RuleTask>) -> Self {
        self.tasks = tasks.into_iter().collect();
        self
    }

    /// Add rules that must run before this one.
    #[must_use]
    pub fn depends_on(mut self, rules: impl IntoIterator<Item = RuleId>) -> Self {
        self.depends_on.extend(rules);
        self
    }

    /// Add rules that must run after this one.
    #[must_use]
    pub fn execute_before(mut self, rules: impl IntoIterator<Item = RuleId>) -> Self {
        self.execute_before.extend(rules);
        self
    }

    /// Add rules to run when this one faults.
    #[must_use]
    pub fn on_error(mut self, rules: impl IntoIterator<Item = RuleId>) -> Self {
        self.on_error.extend(rules);
        self
    }

    /// Restrict eligibility to the given lifecycle events.
    #[must_use]
    pub fn on_events(mut self, events: impl IntoIterator<Item = RuleEvent>) -> Self {
        self.execute_on_event.extend(events);
        self
    }

    /// Unique rule identifier.
    pub fn name(&self) -> &RuleId {
        &self.name
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Kinds targeted directly (subtypes are implied).
    pub fn target_kinds(&self) -> &BTreeSet<ElementKind> {
        &self.applies_to
    }

    /// Tasks this rule serves.
    pub fn task_set(&self) -> &BTreeSet<RuleTask> {
        &self.tasks
    }

    /// Rules that must run before this one.
    pub fn dependencies(&self) -> &BTreeSet<RuleId> {
        &self.depends_on
    }

    /// Rules that must run after this one.
    pub fn successors(&self) -> &BTreeSet<RuleId> {
        &self.execute_before
    }

    /// Rules run when this one faults.
    pub fn error_handlers(&self) -> &BTreeSet<RuleId> {
        &self.on_error
    }

    /// Events gating eligibility; empty means always eligible.
    pub fn events(&self) -> &BTreeSet<RuleEvent> {
        &self.execute_on_event
    }

    /// Returns `true` if this rule serves `task`.
    pub fn serves(&self, task: RuleTask) -> bool {
        self.tasks.contains(&task)
    }

    /// Returns `true` if this rule targets `kind` directly or through a supertype.
    pub fn applies_to_kind(&self, kind: ElementKind) -> bool {
        kind.chain().iter().any(|k| self.applies_to.contains(k))
    }

    /// Returns `true` if the rule may run for an invocation triggered by `event`.
    pub fn is_eligible(&self, event: Option<RuleEvent>) -> bool {
        if self.execute_on_event.is_empty() {
            return true;
        }
        event.is_some_and(|e| self.execute_on_event.contains(&e))
    }
}
