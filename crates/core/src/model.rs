//! Registry entities that rules operate on.
//!
//! These are plain, already-loaded values. Resolving references between
//! entities (type refs, parent profiles) is the storage layer's job; rules
//! only see what is stored on the entity itself.

use serde::{Deserialize, Serialize};

use crate::kind::ElementKind;

/// Primitive value type backing an [`AtomicDataType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    /// Text.
    String,
    /// Whole numbers.
    Integer,
    /// Floating point numbers.
    Number,
    /// `true` / `false`.
    Boolean,
}

impl PrimitiveType {
    /// Returns `true` for `Integer` and `Number`.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
        }
    }
}

/// A data type backed by a primitive, optionally narrowed by constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicDataType {
    /// Persistent identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Underlying primitive.
    pub base_type: PrimitiveType,
    /// Regular expression every value must match (string types).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Closed set of allowed values (string types).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// Inclusive lower bound (numeric types).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound (numeric types).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Id of the atomic type this one refines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits_from: Option<String>,
}

impl AtomicDataType {
    /// Create an unconstrained atomic type.
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_type: PrimitiveType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            base_type,
            pattern: None,
            enum_values: Vec::new(),
            minimum: None,
            maximum: None,
            inherits_from: None,
        }
    }

    /// Set the value pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Set the allowed values.
    #[must_use]
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set the inclusive range.
    #[must_use]
    pub fn with_range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }
}

/// A named, typed slot of a [`TypeProfile`] or [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Persistent identifier.
    pub id: String,
    /// Attribute name, unique within its owner.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Id of the data type of this attribute's values.
    pub type_ref: String,
    /// Minimum number of occurrences.
    #[serde(default)]
    pub lower_bound: u32,
    /// Maximum number of occurrences; `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<u32>,
    /// Value used when the attribute is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl Attribute {
    /// Create an optional, single-valued attribute.
    pub fn new(id: impl Into<String>, name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            type_ref: type_ref.into(),
            lower_bound: 0,
            upper_bound: Some(1),
            default_value: None,
        }
    }

    /// Set the cardinality bounds.
    #[must_use]
    pub fn with_bounds(mut self, lower: u32, upper: Option<u32>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }
}

/// A composite type made of attributes, optionally extending other profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeProfile {
    /// Persistent identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attributes declared directly on this profile.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Ids of the profiles this one extends.
    #[serde(default)]
    pub inherits_from: Vec<String>,
    /// Whether instances may carry attributes not declared here.
    #[serde(default)]
    pub allow_additional_attributes: bool,
}

impl TypeProfile {
    /// Create an empty profile.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            attributes: Vec::new(),
            inherits_from: Vec::new(),
            allow_additional_attributes: false,
        }
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append a parent profile id.
    #[must_use]
    pub fn inherits(mut self, parent: impl Into<String>) -> Self {
        self.inherits_from.push(parent.into());
        self
    }
}

/// An operation over typed inputs, producing typed outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Persistent identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Input parameters.
    #[serde(default)]
    pub inputs: Vec<Attribute>,
    /// Output values.
    #[serde(default)]
    pub outputs: Vec<Attribute>,
    /// Reference to the executable implementing the operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<String>,
}

impl Operation {
    /// Create an operation without inputs or outputs.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            execution: None,
        }
    }

    /// Append an input.
    #[must_use]
    pub fn with_input(mut self, input: Attribute) -> Self {
        self.inputs.push(input);
        self
    }

    /// Append an output.
    #[must_use]
    pub fn with_output(mut self, output: Attribute) -> Self {
        self.outputs.push(output);
        self
    }
}

/// Any registry element a rule can target.
///
/// The variant set is closed; see [`ElementVisitor`](crate::ElementVisitor)
/// for exhaustive per-variant dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisitableElement {
    /// An atomic data type.
    AtomicDataType(AtomicDataType),
    /// A type profile.
    TypeProfile(TypeProfile),
    /// A standalone attribute.
    Attribute(Attribute),
    /// An operation.
    Operation(Operation),
}

impl VisitableElement {
    /// Concrete kind of this element.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::AtomicDataType(_) => ElementKind::AtomicDataType,
            Self::TypeProfile(_) => ElementKind::TypeProfile,
            Self::Attribute(_) => ElementKind::Attribute,
            Self::Operation(_) => ElementKind::Operation,
        }
    }

    /// Persistent identifier of the element.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::AtomicDataType(e) => &e.id,
            Self::TypeProfile(e) => &e.id,
            Self::Attribute(e) => &e.id,
            Self::Operation(e) => &e.id,
        }
    }

    /// Human-readable name of the element.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::AtomicDataType(e) => &e.name,
            Self::TypeProfile(e) => &e.name,
            Self::Attribute(e) => &e.name,
            Self::Operation(e) => &e.name,
        }
    }
}

impl From<AtomicDataType> for VisitableElement {
    fn from(value: AtomicDataType) -> Self {
        Self::AtomicDataType(value)
    }
}

impl From<TypeProfile> for VisitableElement {
    fn from(value: TypeProfile) -> Self {
        Self::TypeProfile(value)
    }
}

impl From<Attribute> for VisitableElement {
    fn from(value: Attribute) -> Self {
        Self::Attribute(value)
    }
}

impl From<Operation> for VisitableElement {
    fn from(value: Operation) -> Self {
        Self::Operation(value)
    }
}
