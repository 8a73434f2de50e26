//! Rules over attributes, wherever they are declared, and operations.

use dtr_core::{
    AtomicDataType, Attribute, ElementKind, ElementVisitor, Operation, RuleIdError, TypeProfile,
    VisitableElement,
};
use dtr_rule::{
    ExecutionError, FnRule, OutputMessage, RuleContext, RuleDeclaration, RuleOutput, RuleRegistry,
    Severity, VisitorRule,
};

use crate::finding;

/// `lower_bound <= upper_bound` for every attribute.
pub const CARDINALITY: &str = "attribute.cardinality";
/// Operations should produce something.
pub const HAS_OUTPUTS: &str = "operation.has-outputs";

pub(crate) fn register(registry: &mut RuleRegistry) -> Result<(), RuleIdError> {
    registry
        .register(
            RuleDeclaration::new(CARDINALITY)?
                .describe("attribute lower bounds do not exceed upper bounds")
                .applies_to([
                    ElementKind::Attribute,
                    ElementKind::TypeProfile,
                    ElementKind::Operation,
                ]),
            VisitorRule::new(Cardinality),
        )
        .register(
            RuleDeclaration::new(HAS_OUTPUTS)?
                .describe("operations declare at least one output")
                .applies_to([ElementKind::Operation]),
            FnRule::new(|ctx: &RuleContext<'_>| {
                let element = ctx.element;
                let VisitableElement::Operation(operation) = element else {
                    return Err(ExecutionError::Unsupported(element.kind()));
                };
                if operation.outputs.is_empty() {
                    Ok(RuleOutput::empty().with_message(finding(
                        Severity::Warning,
                        &operation.id,
                        format!("operation '{}' declares no outputs", operation.name),
                    )))
                } else {
                    Ok(RuleOutput::empty())
                }
            }),
        );

    Ok(())
}

/// Checks standalone attributes and the ones embedded in profiles and
/// operations.
struct Cardinality;

impl Cardinality {
    fn check<'a>(
        owner: &'a str,
        attributes: impl IntoIterator<Item = &'a Attribute> + 'a,
    ) -> impl Iterator<Item = OutputMessage> + 'a {
        attributes.into_iter().filter_map(move |attribute| match attribute.upper_bound {
            Some(upper) if attribute.lower_bound > upper => Some(
                finding(
                    Severity::Error,
                    owner,
                    format!(
                        "attribute '{}' has lower bound {} above upper bound {upper}",
                        attribute.name, attribute.lower_bound
                    ),
                )
                .related_to(attribute.id.as_str()),
            ),
            _ => None,
        })
    }
}

impl ElementVisitor for Cardinality {
    type Output = Result<RuleOutput, ExecutionError>;

    fn visit_atomic_data_type(&self, _: &AtomicDataType) -> Self::Output {
        Err(ExecutionError::Unsupported(ElementKind::AtomicDataType))
    }

    fn visit_type_profile(&self, element: &TypeProfile) -> Self::Output {
        Ok(Self::check(&element.id, &element.attributes).collect())
    }

    fn visit_attribute(&self, element: &Attribute) -> Self::Output {
        Ok(Self::check(&element.id, [element]).collect())
    }

    fn visit_operation(&self, element: &Operation) -> Self::Output {
        Ok(Self::check(&element.id, element.inputs.iter().chain(&element.outputs)).collect())
    }
}
