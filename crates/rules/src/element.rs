//! Rules every element is subject to.

use dtr_core::{ElementKind, RuleId, RuleIdError};
use dtr_rule::{FnRule, RuleContext, RuleDeclaration, RuleEvent, RuleOutput, RuleRegistry, Severity};

use crate::finding;

/// Elements carry a non-blank name.
pub const HAS_NAME: &str = "element.has-name";
/// Element ids are non-empty and contain no whitespace.
pub const ID_FORMAT: &str = "element.id-format";
/// Reminds callers that deleting a data type needs a dependents check.
pub const DELETE_GUARD: &str = "datatype.delete-guard";

pub(crate) fn register(registry: &mut RuleRegistry) -> Result<(), RuleIdError> {
    registry
        .register(
            RuleDeclaration::new(HAS_NAME)?
                .describe("every element has a non-blank name")
                .applies_to([ElementKind::Element])
                .execute_before([RuleId::new(ID_FORMAT)?]),
            FnRule::new(|ctx: &RuleContext<'_>| {
                let element = ctx.element;
                if element.name().trim().is_empty() {
                    Ok(RuleOutput::empty().with_message(finding(
                        Severity::Error,
                        element.id(),
                        format!("{} '{}' has no name", element.kind(), element.id()),
                    )))
                } else {
                    Ok(RuleOutput::empty())
                }
            }),
        )
        .register(
            RuleDeclaration::new(ID_FORMAT)?
                .describe("element ids are non-empty and contain no whitespace")
                .applies_to([ElementKind::Element]),
            FnRule::new(|ctx: &RuleContext<'_>| {
                let element = ctx.element;
                let id = element.id();
                let problem = if id.is_empty() {
                    Some(format!("{} '{}' has an empty id", element.kind(), element.name()))
                } else if id.chars().any(char::is_whitespace) {
                    Some(format!("id '{id}' contains whitespace"))
                } else {
                    None
                };
                Ok(problem
                    .map(|text| finding(Severity::Error, id, text))
                    .into_iter()
                    .collect())
            }),
        )
        .register(
            RuleDeclaration::new(DELETE_GUARD)?
                .describe("deleting a data type requires checking its dependents")
                .applies_to([ElementKind::DataType])
                .on_events([RuleEvent::OnDelete]),
            FnRule::new(|ctx: &RuleContext<'_>| {
                Ok(RuleOutput::empty().with_message(finding(
                    Severity::Info,
                    ctx.element.id(),
                    format!(
                        "'{}' is being deleted; profiles and attributes referring to it must be checked",
                        ctx.element.name()
                    ),
                )))
            }),
        );

    Ok(())
}
