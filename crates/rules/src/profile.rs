//! Rules over [`TypeProfile`] structure.

use std::collections::BTreeMap;

use dtr_core::{ElementKind, RuleIdError, TypeProfile, VisitableElement};
use dtr_rule::{
    ExecutionError, FnRule, RuleContext, RuleDeclaration, RuleOutput, RuleRegistry, RuleTask,
    Severity,
};

use crate::finding;

/// Attribute names are unique within a profile.
pub const UNIQUE_ATTRIBUTE_NAMES: &str = "profile.unique-attribute-names";
/// A profile does not extend itself.
pub const NO_SELF_INHERITANCE: &str = "profile.no-self-inheritance";
/// Suggests replacing a profile that only renames its parent.
pub const FLATTEN_HINT: &str = "profile.flatten-hint";

pub(crate) fn register(registry: &mut RuleRegistry) -> Result<(), RuleIdError> {
    let kinds = [ElementKind::TypeProfile];

    registry
        .register(
            RuleDeclaration::new(UNIQUE_ATTRIBUTE_NAMES)?
                .describe("attribute names are unique within a profile")
                .applies_to(kinds),
            FnRule::new(|ctx: &RuleContext<'_>| profile(ctx.element).map(unique_attribute_names)),
        )
        .register(
            RuleDeclaration::new(NO_SELF_INHERITANCE)?
                .describe("a profile does not list itself as a parent")
                .applies_to(kinds),
            FnRule::new(|ctx: &RuleContext<'_>| profile(ctx.element).map(no_self_inheritance)),
        )
        .register(
            RuleDeclaration::new(FLATTEN_HINT)?
                .describe("profiles with one parent and no attributes can be replaced by the parent")
                .applies_to(kinds)
                .tasks([RuleTask::Optimize]),
            FnRule::new(|ctx: &RuleContext<'_>| profile(ctx.element).map(flatten_hint)),
        );

    Ok(())
}

fn profile(element: &VisitableElement) -> Result<&TypeProfile, ExecutionError> {
    match element {
        VisitableElement::TypeProfile(profile) => Ok(profile),
        other => Err(ExecutionError::Unsupported(other.kind())),
    }
}

fn unique_attribute_names(profile: &TypeProfile) -> RuleOutput {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for attribute in &profile.attributes {
        *counts.entry(attribute.name.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(name, count)| {
            finding(
                Severity::Error,
                &profile.id,
                format!("profile '{}' declares attribute '{name}' {count} times", profile.name),
            )
        })
        .collect()
}

fn no_self_inheritance(profile: &TypeProfile) -> RuleOutput {
    if profile.inherits_from.iter().any(|parent| *parent == profile.id) {
        RuleOutput::empty().with_message(finding(
            Severity::Error,
            &profile.id,
            format!("profile '{}' inherits from itself", profile.name),
        ))
    } else {
        RuleOutput::empty()
    }
}

fn flatten_hint(profile: &TypeProfile) -> RuleOutput {
    match profile.inherits_from.as_slice() {
        [parent] if profile.attributes.is_empty() => RuleOutput::empty().with_message(
            finding(
                Severity::Info,
                &profile.id,
                format!(
                    "profile '{}' adds nothing to '{parent}' and could be replaced by it",
                    profile.name
                ),
            )
            .related_to(parent.as_str()),
        ),
        _ => RuleOutput::empty(),
    }
}
