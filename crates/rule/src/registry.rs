//! Startup-time rule registration and validation.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use dtr_core::RuleId;

use crate::declaration::RuleDeclaration;
use crate::error::{ConfigProblem, ConfigurationError, Relation};
use crate::rule::Rule;

/// A declaration paired with its executable body.
#[derive(Clone)]
pub struct RegisteredRule {
    declaration: RuleDeclaration,
    body: Arc<dyn Rule>,
}

impl RegisteredRule {
    /// Declared facts about the rule.
    pub fn declaration(&self) -> &RuleDeclaration {
        &self.declaration
    }

    /// Executable body.
    pub fn body(&self) -> &Arc<dyn Rule> {
        &self.body
    }

    /// Rule identifier.
    pub fn id(&self) -> &RuleId {
        self.declaration.name()
    }
}

impl std::fmt::Debug for RegisteredRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredRule")
            .field("declaration", &self.declaration)
            .finish_non_exhaustive()
    }
}

/// Collects rule registrations during startup.
///
/// Registration never fails; every problem is detected by
/// [`finalize`](Self::finalize) and reported at once.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    entries: Vec<RegisteredRule>,
}

impl RuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule.
    pub fn register(&mut self, declaration: RuleDeclaration, body: impl Rule + 'static) -> &mut Self {
        self.register_shared(declaration, Arc::new(body))
    }

    /// Register a rule whose body is already shared.
    pub fn register_shared(&mut self, declaration: RuleDeclaration, body: Arc<dyn Rule>) -> &mut Self {
        tracing::trace!(rule = %declaration.name(), "registering rule");
        self.entries.push(RegisteredRule { declaration, body });
        self
    }

    /// Number of registrations so far, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate every registration and freeze the result.
    ///
    /// Detects duplicate names, empty `applies_to`, empty task sets,
    /// self-references and references to unregistered rules. All problems
    /// are returned together.
    pub fn finalize(self) -> Result<RuleSet, ConfigurationError> {
        let mut problems = Vec::new();

        let mut seen: HashSet<&RuleId> = HashSet::new();
        let mut reported_duplicates: HashSet<&RuleId> = HashSet::new();
        for entry in &self.entries {
            let name = entry.id();
            if !seen.insert(name) && reported_duplicates.insert(name) {
                problems.push(ConfigProblem::DuplicateRule(name.clone()));
            }
        }

        for entry in &self.entries {
            let declaration = &entry.declaration;
            let name = declaration.name();

            if declaration.target_kinds().is_empty() {
                problems.push(ConfigProblem::EmptyAppliesTo(name.clone()));
            }
            if declaration.task_set().is_empty() {
                problems.push(ConfigProblem::NoTasks(name.clone()));
            }

            let relations = [
                (Relation::DependsOn, declaration.dependencies()),
                (Relation::ExecuteBefore, declaration.successors()),
                (Relation::OnError, declaration.error_handlers()),
            ];
            for (relation, targets) in relations {
                for target in targets {
                    if target == name {
                        problems.push(ConfigProblem::SelfReference {
                            rule: name.clone(),
                            relation,
                        });
                    } else if !seen.contains(target) {
                        problems.push(ConfigProblem::UnknownReference {
                            rule: name.clone(),
                            relation,
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        if let Some(err) = ConfigurationError::from_problems(problems) {
            tracing::error!(problems = err.problems().len(), "rule registry rejected");
            return Err(err);
        }

        let rules: BTreeMap<RuleId, RegisteredRule> = self
            .entries
            .into_iter()
            .map(|entry| (entry.id().clone(), entry))
            .collect();
        let handlers: BTreeSet<RuleId> = rules
            .values()
            .flat_map(|entry| entry.declaration.error_handlers().iter().cloned())
            .collect();

        tracing::debug!(rules = rules.len(), handlers = handlers.len(), "rule registry finalized");
        Ok(RuleSet { rules, handlers })
    }
}

/// The validated, immutable set of registered rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: BTreeMap<RuleId, RegisteredRule>,
    handlers: BTreeSet<RuleId>,
}

impl RuleSet {
    /// Look up a rule by id.
    pub fn get(&self, id: &str) -> Option<&RegisteredRule> {
        self.rules.get(id)
    }

    /// Look up a rule's declaration by id.
    pub fn declaration(&self, id: &str) -> Option<&RuleDeclaration> {
        self.rules.get(id).map(RegisteredRule::declaration)
    }

    /// Returns `true` if a rule with this id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    /// All rules in lexical id order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredRule> {
        self.rules.values()
    }

    /// All declarations in lexical id order.
    pub fn declarations(&self) -> impl Iterator<Item = &RuleDeclaration> {
        self.rules.values().map(RegisteredRule::declaration)
    }

    /// Rules named in at least one `on_error` set.
    pub fn handler_rules(&self) -> &BTreeSet<RuleId> {
        &self.handlers
    }

    /// Returns `true` if `id` serves as an error handler of some rule.
    pub fn is_handler(&self, id: &str) -> bool {
        self.handlers.contains(id)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
