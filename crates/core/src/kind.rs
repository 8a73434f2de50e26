//! Element kind hierarchy.

use serde::{Deserialize, Serialize};

/// Tag identifying a variant of registry element.
///
/// Kinds form a fixed single-inheritance tree rooted at [`ElementKind::Element`]:
///
/// ```text
/// Element
/// ├── DataType
/// │   ├── AtomicDataType
/// │   └── TypeProfile
/// ├── Attribute
/// └── Operation
/// ```
///
/// A rule that applies to a kind applies to every subtype of it as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Root of the hierarchy. Abstract.
    Element,
    /// Any data type definition. Abstract.
    DataType,
    /// A primitive-backed data type with optional constraints.
    AtomicDataType,
    /// A composite type built from attributes.
    TypeProfile,
    /// A named, typed slot of a profile or operation.
    Attribute,
    /// An operation over typed inputs and outputs.
    Operation,
}

impl ElementKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Element,
        Self::DataType,
        Self::AtomicDataType,
        Self::TypeProfile,
        Self::Attribute,
        Self::Operation,
    ];

    /// Direct supertype, or `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Element => None,
            Self::DataType | Self::Attribute | Self::Operation => Some(Self::Element),
            Self::AtomicDataType | Self::TypeProfile => Some(Self::DataType),
        }
    }

    /// This kind followed by all of its supertypes, root last.
    #[must_use]
    pub fn chain(self) -> Vec<Self> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent() {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Returns `true` if `self` is `other` or inherits from it.
    #[must_use]
    pub fn is_subtype_of(self, other: Self) -> bool {
        self.chain().contains(&other)
    }

    /// Returns `true` if no element is ever of exactly this kind.
    #[must_use]
    pub fn is_abstract(self) -> bool {
        matches!(self, Self::Element | Self::DataType)
    }

    /// Kinds that concrete elements can have.
    pub fn concrete() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(|kind| !kind.is_abstract())
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Element => write!(f, "element"),
            Self::DataType => write!(f, "data_type"),
            Self::AtomicDataType => write!(f, "atomic_data_type"),
            Self::TypeProfile => write!(f, "type_profile"),
            Self::Attribute => write!(f, "attribute"),
            Self::Operation => write!(f, "operation"),
        }
    }
}
