//! Rules over [`AtomicDataType`] constraints.

use dtr_core::{AtomicDataType, ElementKind, PrimitiveType, RuleId, RuleIdError, VisitableElement};
use dtr_rule::{
    ExecutionError, FnRule, RuleContext, RuleDeclaration, RuleOutput, RuleRegistry, Severity,
};
use regex::Regex;

use crate::finding;

/// Constraints must fit the base type.
pub const BASE_TYPE_CONSTRAINTS: &str = "atomic.base-type-constraints";
/// The value pattern must compile.
pub const PATTERN_COMPILES: &str = "atomic.pattern-compiles";
/// `minimum <= maximum`.
pub const RANGE_CONSISTENT: &str = "atomic.range-consistent";
/// Every enum value must match the pattern.
pub const ENUM_VALUES_MATCH_PATTERN: &str = "atomic.enum-values-match-pattern";
/// Handler for [`ENUM_VALUES_MATCH_PATTERN`] faults.
pub const PATTERN_FALLBACK: &str = "atomic.pattern-fallback";

pub(crate) fn register(registry: &mut RuleRegistry) -> Result<(), RuleIdError> {
    let kinds = [ElementKind::AtomicDataType];

    registry
        .register(
            RuleDeclaration::new(BASE_TYPE_CONSTRAINTS)?
                .describe("pattern and enum values only on strings, ranges only on numbers")
                .applies_to(kinds),
            FnRule::new(|ctx: &RuleContext<'_>| atomic(ctx.element).map(base_type_constraints)),
        )
        .register(
            RuleDeclaration::new(PATTERN_COMPILES)?
                .describe("the value pattern is a valid regular expression")
                .applies_to(kinds)
                .depends_on([RuleId::new(BASE_TYPE_CONSTRAINTS)?]),
            FnRule::new(|ctx: &RuleContext<'_>| atomic(ctx.element).map(pattern_compiles)),
        )
        .register(
            RuleDeclaration::new(RANGE_CONSISTENT)?
                .describe("minimum does not exceed maximum")
                .applies_to(kinds),
            FnRule::new(|ctx: &RuleContext<'_>| atomic(ctx.element).map(range_consistent)),
        )
        .register(
            RuleDeclaration::new(ENUM_VALUES_MATCH_PATTERN)?
                .describe("every enum value matches the value pattern")
                .applies_to(kinds)
                .depends_on([RuleId::new(PATTERN_COMPILES)?])
                .on_error([RuleId::new(PATTERN_FALLBACK)?]),
            FnRule::new(|ctx: &RuleContext<'_>| enum_values_match_pattern(atomic(ctx.element)?)),
        )
        .register(
            RuleDeclaration::new(PATTERN_FALLBACK)?
                .describe("reports enum values that could not be checked")
                .applies_to(kinds),
            FnRule::new(|ctx: &RuleContext<'_>| {
                Ok(RuleOutput::empty().with_message(finding(
                    Severity::Warning,
                    ctx.element.id(),
                    format!(
                        "enum values of '{}' were not checked against its pattern",
                        ctx.element.name()
                    ),
                )))
            }),
        );

    Ok(())
}

fn atomic(element: &VisitableElement) -> Result<&AtomicDataType, ExecutionError> {
    match element {
        VisitableElement::AtomicDataType(atomic) => Ok(atomic),
        other => Err(ExecutionError::Unsupported(other.kind())),
    }
}

fn base_type_constraints(atomic: &AtomicDataType) -> RuleOutput {
    let mut misplaced = Vec::new();
    if atomic.base_type != PrimitiveType::String {
        if atomic.pattern.is_some() {
            misplaced.push("pattern");
        }
        if !atomic.enum_values.is_empty() {
            misplaced.push("enum_values");
        }
    }
    if !atomic.base_type.is_numeric() {
        if atomic.minimum.is_some() {
            misplaced.push("minimum");
        }
        if atomic.maximum.is_some() {
            misplaced.push("maximum");
        }
    }

    misplaced
        .into_iter()
        .map(|field| {
            finding(
                Severity::Error,
                &atomic.id,
                format!(
                    "'{}' sets {field}, which does not apply to base type {}",
                    atomic.name, atomic.base_type
                ),
            )
        })
        .collect()
}

fn pattern_compiles(atomic: &AtomicDataType) -> RuleOutput {
    let Some(pattern) = &atomic.pattern else {
        return RuleOutput::empty();
    };
    match Regex::new(pattern) {
        Ok(_) => RuleOutput::empty(),
        Err(err) => RuleOutput::empty().with_message(finding(
            Severity::Error,
            &atomic.id,
            format!("pattern of '{}' does not compile: {err}", atomic.name),
        )),
    }
}

fn range_consistent(atomic: &AtomicDataType) -> RuleOutput {
    match (atomic.minimum, atomic.maximum) {
        (Some(min), Some(max)) if min > max => RuleOutput::empty().with_message(finding(
            Severity::Error,
            &atomic.id,
            format!("'{}' has minimum {min} greater than maximum {max}", atomic.name),
        )),
        _ => RuleOutput::empty(),
    }
}

/// Faults when the pattern does not compile; the values cannot be judged.
fn enum_values_match_pattern(atomic: &AtomicDataType) -> Result<RuleOutput, ExecutionError> {
    let Some(pattern) = &atomic.pattern else {
        return Ok(RuleOutput::empty());
    };
    if atomic.enum_values.is_empty() {
        return Ok(RuleOutput::empty());
    }

    // Values must match in full, not just contain a match
    let anchored = Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|err| ExecutionError::fault(format!("pattern '{pattern}' does not compile: {err}")))?;

    Ok(atomic
        .enum_values
        .iter()
        .filter(|value| !anchored.is_match(value))
        .map(|value| {
            finding(
                Severity::Error,
                &atomic.id,
                format!("enum value '{value}' of '{}' does not match its pattern", atomic.name),
            )
        })
        .collect())
}
