#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # DTR Graph
//!
//! Compiles a validated [`RuleSet`](dtr_rule::RuleSet) into the immutable
//! [`PrecomputedRuleGraph`] the engine reads at run time.
//!
//! For every (task, kind) pair the builder selects the applicable rules,
//! merges `depends_on` and `execute_before` into one edge set, and sorts it
//! with Kahn's algorithm, breaking ties by rule name. Any cycle is fatal and
//! reported with the exact rules on it.

pub mod builder;
pub mod graph;
pub mod precomputed;

pub use builder::{GraphBuilder, build_graph};
pub use graph::DependencyGraph;
pub use precomputed::PrecomputedRuleGraph;
