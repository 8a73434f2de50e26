//! The immutable product of a graph build.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use dtr_core::{ElementKind, RuleId};
use dtr_rule::RuleTask;
use serde::{Deserialize, Serialize};

/// Per (task, kind) rule orders plus per-rule error-handler orders.
///
/// Built once by [`GraphBuilder`](crate::GraphBuilder) and read by every
/// invocation afterwards. Only pairs with at least one rule are stored; a
/// missing pair resolves to an empty order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecomputedRuleGraph {
    orders: BTreeMap<RuleTask, BTreeMap<ElementKind, Vec<RuleId>>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    handlers: BTreeMap<RuleId, Vec<RuleId>>,
    #[serde(default)]
    edge_count: usize,
}

impl PrecomputedRuleGraph {
    pub(crate) fn new(
        orders: BTreeMap<RuleTask, BTreeMap<ElementKind, Vec<RuleId>>>,
        handlers: BTreeMap<RuleId, Vec<RuleId>>,
        edge_count: usize,
    ) -> Self {
        Self {
            orders,
            handlers,
            edge_count,
        }
    }

    /// Rules that apply to `kind` for `task`, in execution order.
    ///
    /// Includes rules declared against any supertype of `kind`.
    pub fn order(&self, task: RuleTask, kind: ElementKind) -> &[RuleId] {
        self.orders
            .get(&task)
            .and_then(|by_kind| by_kind.get(&kind))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every rule that applies to an element of `kind` for `task`.
    ///
    /// Walks the kind chain from `kind` up to the root, concatenating each
    /// level's order and keeping only the first occurrence of a rule.
    pub fn resolve(&self, task: RuleTask, kind: ElementKind) -> Vec<RuleId> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for level in kind.chain() {
            for id in self.order(task, level) {
                if seen.insert(id) {
                    resolved.push(id.clone());
                }
            }
        }
        resolved
    }

    /// Error handlers of `rule`, in execution order.
    pub fn handlers(&self, rule: &str) -> &[RuleId] {
        self.handlers
            .get(rule)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns `true` if `rule` occurs in any order or handler order.
    pub fn contains_rule(&self, rule: &str) -> bool {
        self.orders
            .values()
            .flat_map(BTreeMap::values)
            .chain(self.handlers.values())
            .any(|ids| ids.iter().any(|id| id == rule))
    }

    /// Every rule that may run, primary or handler.
    pub fn rule_ids(&self) -> BTreeSet<&RuleId> {
        self.orders
            .values()
            .flat_map(BTreeMap::values)
            .chain(self.handlers.values())
            .flatten()
            .collect()
    }

    /// Stored (task, kind, order) entries in (task, kind) order.
    pub fn entries(&self) -> impl Iterator<Item = (RuleTask, ElementKind, &[RuleId])> {
        self.orders.iter().flat_map(|(&task, by_kind)| {
            by_kind
                .iter()
                .map(move |(&kind, ids)| (task, kind, ids.as_slice()))
        })
    }

    /// Rules with at least one error handler, with their handler orders.
    pub fn handler_entries(&self) -> impl Iterator<Item = (&RuleId, &[RuleId])> {
        self.handlers.iter().map(|(id, ids)| (id, ids.as_slice()))
    }

    /// Ordering constraints, summed over every primary entry.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns `true` if no rule runs for any pair.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.handlers.is_empty()
    }
}
