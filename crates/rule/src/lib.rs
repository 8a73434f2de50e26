#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # DTR Rule
//!
//! Declarative rule model for the data type registry.
//!
//! Rules are authored independently and registered once at startup. This
//! crate provides:
//!
//! - [`RuleTask`] and [`RuleEvent`] applicability filters
//! - [`RuleDeclaration`], the immutable facts about one rule
//! - [`RuleOutput`] / [`OutputMessage`] / [`Severity`], the mergeable report
//! - [`Rule`] plus the [`FnRule`] and [`VisitorRule`] adapters
//! - [`RuleRegistry`] and the validated [`RuleSet`]
//! - [`ConfigurationError`] (fatal, build time) and [`ExecutionError`]
//!   (per rule, recoverable)

pub mod declaration;
pub mod error;
pub mod output;
pub mod registry;
pub mod rule;
pub mod task;

pub use declaration::RuleDeclaration;
pub use error::{ConfigProblem, ConfigurationError, ExecutionError, GraphScope, Relation};
pub use output::{OutputMessage, RuleOutput, Severity};
pub use registry::{RegisteredRule, RuleRegistry, RuleSet};
pub use rule::{FnRule, Rule, RuleContext, VisitorRule};
pub use task::{RuleEvent, RuleTask};
