//! Rule task and lifecycle event enumerations.

use serde::{Deserialize, Serialize};

/// Category of work a rule performs.
///
/// Rule order is computed independently for every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTask {
    /// Check an element for consistency.
    Validate,
    /// Derive data from an element for downstream consumers.
    Consume,
    /// Suggest structural simplifications.
    Optimize,
    /// Produce a schema describing the element.
    GenerateSchema,
}

impl RuleTask {
    /// Every task, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Validate,
        Self::Consume,
        Self::Optimize,
        Self::GenerateSchema,
    ];
}

impl std::fmt::Display for RuleTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validate => write!(f, "validate"),
            Self::Consume => write!(f, "consume"),
            Self::Optimize => write!(f, "optimize"),
            Self::GenerateSchema => write!(f, "generate_schema"),
        }
    }
}

impl std::str::FromStr for RuleTask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "validate" => Ok(Self::Validate),
            "consume" => Ok(Self::Consume),
            "optimize" => Ok(Self::Optimize),
            "generate_schema" => Ok(Self::GenerateSchema),
            other => Err(format!("unknown rule task: {other}")),
        }
    }
}

/// Lifecycle trigger that gates whether a rule is eligible for an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleEvent {
    /// The element is being created.
    OnCreate,
    /// The element is being updated.
    OnUpdate,
    /// The element is being deleted.
    OnDelete,
}

impl std::fmt::Display for RuleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnCreate => write!(f, "on_create"),
            Self::OnUpdate => write!(f, "on_update"),
            Self::OnDelete => write!(f, "on_delete"),
        }
    }
}

impl std::str::FromStr for RuleEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "on_create" | "create" => Ok(Self::OnCreate),
            "on_update" | "update" => Ok(Self::OnUpdate),
            "on_delete" | "delete" => Ok(Self::OnDelete),
            other => Err(format!("unknown rule event: {other}")),
        }
    }
}
