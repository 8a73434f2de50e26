//! Compiles a [`RuleSet`] into a [`PrecomputedRuleGraph`].

use std::collections::{BTreeMap, HashSet};

use dtr_core::{ElementKind, RuleId};
use dtr_rule::{ConfigProblem, ConfigurationError, GraphScope, RuleDeclaration, RuleSet, RuleTask};

use crate::graph::DependencyGraph;
use crate::precomputed::PrecomputedRuleGraph;

/// Builds the per (task, kind) execution orders for a validated rule set.
///
/// The build runs once at startup. Every cycle found anywhere is collected
/// into one [`ConfigurationError`]; no partial graph is ever returned.
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder<'a> {
    rules: &'a RuleSet,
}

impl<'a> GraphBuilder<'a> {
    /// Start a build over `rules`.
    #[must_use]
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Rules that take part in the primary order of (`task`, `kind`).
    ///
    /// A rule qualifies when it serves `task`, targets `kind` or one of its
    /// supertypes, and is not anyone's error handler.
    pub fn select(&self, task: RuleTask, kind: ElementKind) -> Vec<&'a RuleDeclaration> {
        self.rules
            .declarations()
            .filter(|decl| {
                decl.serves(task)
                    && decl.applies_to_kind(kind)
                    && !self.rules.is_handler(decl.name().as_str())
            })
            .collect()
    }

    /// Compute every order, or report every cycle.
    pub fn build(self) -> Result<PrecomputedRuleGraph, ConfigurationError> {
        let mut problems = Vec::new();
        let mut reported: HashSet<(RuleTask, Vec<RuleId>)> = HashSet::new();
        let mut orders: BTreeMap<RuleTask, BTreeMap<ElementKind, Vec<RuleId>>> = BTreeMap::new();
        let mut edge_count = 0;

        for task in RuleTask::ALL {
            for kind in ElementKind::ALL {
                let selected = self.select(task, kind);
                if selected.is_empty() {
                    continue;
                }

                let graph = DependencyGraph::from_rules(selected);
                match graph.topological_order() {
                    Ok(order) => {
                        tracing::debug!(
                            task = %task,
                            kind = %kind,
                            rules = order.len(),
                            edges = graph.edge_count(),
                            "rule order computed"
                        );
                        edge_count += graph.edge_count();
                        orders.entry(task).or_default().insert(kind, order);
                    }
                    Err(cycles) => {
                        for rules in cycles {
                            if reported.insert((task, rules.clone())) {
                                tracing::error!(task = %task, kind = %kind, ?rules, "rule cycle");
                                problems.push(ConfigProblem::Cycle {
                                    scope: GraphScope::Primary { task, kind },
                                    rules,
                                });
                            }
                        }
                    }
                }
            }
        }

        let mut handlers = BTreeMap::new();
        for decl in self.rules.declarations() {
            if decl.error_handlers().is_empty() {
                continue;
            }
            let members: Vec<&RuleDeclaration> = decl
                .error_handlers()
                .iter()
                .filter_map(|id| self.rules.declaration(id.as_str()))
                .collect();
            match DependencyGraph::from_rules(members).topological_order() {
                Ok(order) => {
                    handlers.insert(decl.name().clone(), order);
                }
                Err(cycles) => {
                    for rules in cycles {
                        tracing::error!(rule = %decl.name(), ?rules, "error handler cycle");
                        problems.push(ConfigProblem::Cycle {
                            scope: GraphScope::ErrorHandlers {
                                rule: decl.name().clone(),
                            },
                            rules,
                        });
                    }
                }
            }
        }

        if let Some(err) = ConfigurationError::from_problems(problems) {
            return Err(err);
        }

        let graph = PrecomputedRuleGraph::new(orders, handlers, edge_count);
        tracing::info!(
            entries = graph.entries().count(),
            rules = graph.rule_ids().len(),
            edges = edge_count,
            "rule graph built"
        );
        Ok(graph)
    }
}

/// Shorthand for `GraphBuilder::new(rules).build()`.
pub fn build_graph(rules: &RuleSet) -> Result<PrecomputedRuleGraph, ConfigurationError> {
    GraphBuilder::new(rules).build()
}
