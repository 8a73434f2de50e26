//! JSON-Schema generation.
//!
//! Each rule emits one INFO message whose text is a compact JSON-Schema
//! document for the element. References to other registry types become
//! `$ref`s to their ids; resolving them is the consumer's job.

use dtr_core::{AtomicDataType, Attribute, ElementKind, PrimitiveType, RuleIdError, TypeProfile, VisitableElement};
use dtr_rule::{
    ExecutionError, FnRule, RuleContext, RuleDeclaration, RuleOutput, RuleRegistry, RuleTask,
    Severity,
};
use serde_json::{Map, Value, json};

use crate::finding;

/// Schema for an atomic data type.
pub const SCHEMA_ATOMIC: &str = "schema.atomic";
/// Schema for a type profile.
pub const SCHEMA_PROFILE: &str = "schema.profile";

pub(crate) fn register(registry: &mut RuleRegistry) -> Result<(), RuleIdError> {
    registry
        .register(
            RuleDeclaration::new(SCHEMA_ATOMIC)?
                .describe("JSON-Schema for atomic data types")
                .applies_to([ElementKind::AtomicDataType])
                .tasks([RuleTask::GenerateSchema]),
            FnRule::new(|ctx: &RuleContext<'_>| match ctx.element {
                VisitableElement::AtomicDataType(atomic) => {
                    Ok(schema_output(&atomic.id, &atomic_schema(atomic)))
                }
                other => Err(ExecutionError::Unsupported(other.kind())),
            }),
        )
        .register(
            RuleDeclaration::new(SCHEMA_PROFILE)?
                .describe("JSON-Schema for type profiles")
                .applies_to([ElementKind::TypeProfile])
                .tasks([RuleTask::GenerateSchema]),
            FnRule::new(|ctx: &RuleContext<'_>| match ctx.element {
                VisitableElement::TypeProfile(profile) => {
                    Ok(schema_output(&profile.id, &profile_schema(profile)))
                }
                other => Err(ExecutionError::Unsupported(other.kind())),
            }),
        );

    Ok(())
}

fn schema_output(element_id: &str, schema: &Value) -> RuleOutput {
    RuleOutput::empty().with_message(finding(Severity::Info, element_id, schema.to_string()))
}

fn json_type(base_type: PrimitiveType) -> &'static str {
    match base_type {
        PrimitiveType::String => "string",
        PrimitiveType::Integer => "integer",
        PrimitiveType::Number => "number",
        PrimitiveType::Boolean => "boolean",
    }
}

/// Schema for an atomic type.
pub fn atomic_schema(atomic: &AtomicDataType) -> Value {
    let mut schema = Map::new();
    schema.insert("$id".into(), json!(atomic.id));
    schema.insert("title".into(), json!(atomic.name));
    if let Some(description) = &atomic.description {
        schema.insert("description".into(), json!(description));
    }
    schema.insert("type".into(), json!(json_type(atomic.base_type)));
    if let Some(pattern) = &atomic.pattern {
        schema.insert("pattern".into(), json!(pattern));
    }
    if !atomic.enum_values.is_empty() {
        schema.insert("enum".into(), json!(atomic.enum_values));
    }
    if let Some(minimum) = atomic.minimum {
        schema.insert("minimum".into(), json!(minimum));
    }
    if let Some(maximum) = atomic.maximum {
        schema.insert("maximum".into(), json!(maximum));
    }
    Value::Object(schema)
}

/// Schema for a profile. Parents become an `allOf` of references.
pub fn profile_schema(profile: &TypeProfile) -> Value {
    let properties: Map<String, Value> = profile
        .attributes
        .iter()
        .map(|attribute| (attribute.name.clone(), attribute_schema(attribute)))
        .collect();
    let required: Vec<&str> = profile
        .attributes
        .iter()
        .filter(|attribute| attribute.lower_bound > 0)
        .map(|attribute| attribute.name.as_str())
        .collect();

    let mut schema = Map::new();
    schema.insert("$id".into(), json!(profile.id));
    schema.insert("title".into(), json!(profile.name));
    if let Some(description) = &profile.description {
        schema.insert("description".into(), json!(description));
    }
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    schema.insert(
        "additionalProperties".into(),
        json!(profile.allow_additional_attributes),
    );
    if !profile.inherits_from.is_empty() {
        let parents: Vec<Value> = profile
            .inherits_from
            .iter()
            .map(|parent| json!({ "$ref": parent }))
            .collect();
        schema.insert("allOf".into(), Value::Array(parents));
    }
    Value::Object(schema)
}

/// Single-valued attributes reference their type directly, others become
/// arrays of it.
fn attribute_schema(attribute: &Attribute) -> Value {
    let reference = json!({ "$ref": attribute.type_ref });
    let mut schema = match attribute.upper_bound {
        Some(1) => reference,
        upper => {
            let mut array = Map::new();
            array.insert("type".into(), json!("array"));
            array.insert("items".into(), reference);
            if attribute.lower_bound > 0 {
                array.insert("minItems".into(), json!(attribute.lower_bound));
            }
            if let Some(upper) = upper {
                array.insert("maxItems".into(), json!(upper));
            }
            Value::Object(array)
        }
    };
    if let (Some(default), Value::Object(map)) = (&attribute.default_value, &mut schema) {
        map.insert("default".into(), json!(default));
    }
    schema
}
