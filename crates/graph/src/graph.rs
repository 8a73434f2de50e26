//! Ordering graph for one scope, built on `petgraph`.

use std::collections::{BTreeMap, HashMap};

use dtr_core::RuleId;
use dtr_rule::RuleDeclaration;
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};

/// Directed graph of "runs before" constraints among a fixed set of rules.
///
/// An edge `a → b` means `a` must run before `b`. Both `depends_on` and
/// `execute_before` are folded into the same edge set, so a constraint
/// declared from both sides yields a single edge.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<RuleId, ()>,
    index_map: HashMap<RuleId, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph over exactly `rules`.
    ///
    /// References to rules outside the set are ignored.
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = &'a RuleDeclaration>) -> Self {
        let rules: Vec<&RuleDeclaration> = rules.into_iter().collect();
        let mut graph = DiGraph::with_capacity(rules.len(), 0);
        let mut index_map = HashMap::with_capacity(rules.len());

        for rule in &rules {
            let idx = graph.add_node(rule.name().clone());
            index_map.insert(rule.name().clone(), idx);
        }

        for rule in &rules {
            let this = index_map[rule.name()];
            for dependency in rule.dependencies() {
                if let Some(&before) = index_map.get(dependency) {
                    graph.update_edge(before, this, ());
                }
            }
            for successor in rule.successors() {
                if let Some(&after) = index_map.get(successor) {
                    graph.update_edge(this, after, ());
                }
            }
        }

        Self { graph, index_map }
    }

    /// Kahn's algorithm, always taking the lexically smallest ready rule.
    ///
    /// The result depends only on the rule set and its edges, never on the
    /// order rules were added. Returns the rules on every cycle when the
    /// graph is not a DAG.
    pub fn topological_order(&self) -> Result<Vec<RuleId>, Vec<Vec<RuleId>>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                (
                    idx,
                    self.graph
                        .neighbors_directed(idx, Direction::Incoming)
                        .count(),
                )
            })
            .collect();

        let mut ready: BTreeMap<&RuleId, NodeIndex> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&idx, _)| (&self.graph[idx], idx))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some((id, idx)) = ready.pop_first() {
            order.push(id.clone());
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(deg) = in_degree.get_mut(&next) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert(&self.graph[next], next);
                    }
                }
            }
        }

        if order.len() == self.graph.node_count() {
            Ok(order)
        } else {
            Err(self.cycles())
        }
    }

    /// Every set of rules that lies on a cycle, each sorted, in lexical order.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<RuleId>> {
        let mut cycles: Vec<Vec<RuleId>> = algo::tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || self.graph.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut rules: Vec<RuleId> = component
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect();
                rules.sort();
                rules
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Returns `true` if the graph contains at least one cycle.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        algo::is_cyclic_directed(&self.graph)
    }

    /// Rules that must run directly before `id`.
    #[must_use]
    pub fn predecessors(&self, id: &str) -> Vec<RuleId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Rules that must run directly after `id`.
    #[must_use]
    pub fn successors(&self, id: &str) -> Vec<RuleId> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<RuleId> {
        let Some(&idx) = self.index_map.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<RuleId> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|i| self.graph[i].clone())
            .collect();
        ids.sort();
        ids
    }

    /// Number of rules in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct ordering constraints.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtr_core::ElementKind;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> RuleId {
        RuleId::new(s).unwrap()
    }

    fn rule(name: &str) -> RuleDeclaration {
        RuleDeclaration::new(name)
            .unwrap()
            .applies_to([ElementKind::Element])
    }

    fn names(ids: &[RuleId]) -> Vec<&str> {
        ids.iter().map(RuleId::as_str).collect()
    }

    #[test]
    fn linear_depends_on() {
        let rules = [
            rule("c").depends_on([id("b")]),
            rule("b").depends_on([id("a")]),
            rule("a"),
        ];
        let graph = DependencyGraph::from_rules(&rules);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(names(&graph.topological_order().unwrap()), vec!["a", "b", "c"]);
    }

    #[test]
    fn execute_before_reverses_direction() {
        let rules = [rule("a"), rule("z").execute_before([id("a")])];
        let graph = DependencyGraph::from_rules(&rules);
        assert_eq!(names(&graph.topological_order().unwrap()), vec!["z", "a"]);
    }

    #[test]
    fn both_sides_of_a_constraint_merge_into_one_edge() {
        let rules = [
            rule("a").execute_before([id("b")]),
            rule("b").depends_on([id("a")]),
        ];
        let graph = DependencyGraph::from_rules(&rules);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.successors("a"), vec![id("b")]);
        assert_eq!(graph.predecessors("b"), vec![id("a")]);
    }

    #[test]
    fn ignores_references_outside_the_set() {
        let rules = [rule("a").depends_on([id("elsewhere")])];
        let graph = DependencyGraph::from_rules(&rules);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(names(&graph.topological_order().unwrap()), vec!["a"]);
    }

    #[test]
    fn ties_break_lexically() {
        let rules = [
            rule("d"),
            rule("b").depends_on([id("a")]),
            rule("c"),
            rule("a"),
        ];
        let graph = DependencyGraph::from_rules(&rules);
        // a is ready with c and d; b becomes ready after a and sorts before c.
        assert_eq!(
            names(&graph.topological_order().unwrap()),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn diamond() {
        let rules = [
            rule("top"),
            rule("left").depends_on([id("top")]),
            rule("right").depends_on([id("top")]),
            rule("bottom").depends_on([id("left"), id("right")]),
        ];
        let graph = DependencyGraph::from_rules(&rules);
        assert_eq!(
            names(&graph.topological_order().unwrap()),
            vec!["top", "left", "right", "bottom"]
        );
    }

    #[test]
    fn reports_only_rules_on_the_cycle() {
        let rules = [
            rule("a").depends_on([id("b")]),
            rule("b").depends_on([id("a")]),
            rule("downstream").depends_on([id("a")]),
            rule("free"),
        ];
        let graph = DependencyGraph::from_rules(&rules);
        assert!(graph.has_cycle());
        let cycles = graph.topological_order().unwrap_err();
        assert_eq!(cycles, vec![vec![id("a"), id("b")]]);
    }

    #[test]
    fn reports_independent_cycles_separately() {
        let rules = [
            rule("a").execute_before([id("b")]),
            rule("b").execute_before([id("a")]),
            rule("x").depends_on([id("y")]),
            rule("y").depends_on([id("z")]),
            rule("z").depends_on([id("x")]),
        ];
        let graph = DependencyGraph::from_rules(&rules);
        assert_eq!(
            graph.cycles(),
            vec![vec![id("a"), id("b")], vec![id("x"), id("y"), id("z")]]
        );
    }

    #[test]
    fn unknown_rule_has_no_neighbors() {
        let graph = DependencyGraph::from_rules(&[rule("a")]);
        assert!(graph.predecessors("missing").is_empty());
    }
}
