#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # DTR Rules
//!
//! The registry's standard rule set.
//!
//! | Group | Rules |
//! |-------|-------|
//! | [`atomic`] | base type constraints, pattern, range, enum values |
//! | [`element`] | name and id format, delete guard |
//! | [`structure`] | attribute cardinality, operation outputs |
//! | [`profile`] | attribute names, inheritance, flattening hint |
//! | [`schema`] | JSON-Schema fragments |
//!
//! ```rust,ignore
//! let registry = dtr_rules::builtin_registry()?;
//! let engine = RuleEngine::bootstrap(registry, EngineConfig::default())?;
//! ```

pub mod atomic;
pub mod element;
pub mod profile;
pub mod schema;
pub mod structure;

use dtr_core::RuleIdError;
use dtr_rule::{OutputMessage, RuleRegistry, Severity};

/// A registry holding every built-in rule.
pub fn builtin_registry() -> Result<RuleRegistry, RuleIdError> {
    let mut registry = RuleRegistry::new();
    register_builtin(&mut registry)?;
    Ok(registry)
}

/// Add every built-in rule to `registry`.
pub fn register_builtin(registry: &mut RuleRegistry) -> Result<(), RuleIdError> {
    atomic::register(registry)?;
    element::register(registry)?;
    structure::register(registry)?;
    profile::register(registry)?;
    schema::register(registry)?;
    tracing::debug!(rules = registry.len(), "registered built-in rules");
    Ok(())
}

/// A message about the element with id `element_id`.
pub(crate) fn finding(severity: Severity, element_id: &str, text: impl Into<String>) -> OutputMessage {
    OutputMessage::new(severity, text).related_to(element_id)
}

#[cfg(test)]
pub(crate) mod testing {
    use dtr_core::VisitableElement;
    use dtr_rule::{ExecutionError, RegisteredRule, RuleContext, RuleOutput, RuleRegistry, RuleTask};

    /// Finalize `registry` and run the rule named `name` alone.
    pub fn apply(
        registry: RuleRegistry,
        name: &str,
        element: impl Into<VisitableElement>,
    ) -> Result<RuleOutput, ExecutionError> {
        let rules = registry.finalize().unwrap();
        let rule: &RegisteredRule = rules.get(name).unwrap();
        let element = element.into();
        let accumulated = RuleOutput::empty();
        let task = rule
            .declaration()
            .task_set()
            .iter()
            .next()
            .copied()
            .unwrap_or(RuleTask::Validate);
        rule.body().apply(&RuleContext {
            element: &element,
            task,
            event: None,
            accumulated: &accumulated,
        })
    }

    pub fn texts(output: &RuleOutput) -> Vec<&str> {
        output.iter().map(|m| m.text.as_str()).collect()
    }
}
