//! Cycle report for module dependency graphs
//!
//! Hosts that resolve imports before running the analysis can feed their
//! module graph through the same detector the solver uses.

use super::tarjan::detect_sccs;
use petgraph::graph::DiGraph;
use rustc_hash::FxHashMap;

/// Module dependency graph (edge = "imports")
#[derive(Debug, Default, Clone)]
pub struct ModuleDependencyGraph {
    graph: DiGraph<String, ()>,
    index: FxHashMap<String, petgraph::graph::NodeIndex>,
}

impl ModuleDependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, name: &str) -> petgraph::graph::NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Record that `from` imports `to`
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let a = self.node(from);
        let b = self.node(to);
        if !self.graph.contains_edge(a, b) {
            self.graph.add_edge(a, b, ());
        }
    }

    /// Cyclic import groups, each sorted by name, dependencies first
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let result = detect_sccs(&self.graph);
        result
            .components()
            .iter()
            .filter(|c| c.is_cycle)
            .map(|c| {
                let mut names: Vec<String> =
                    c.members.iter().map(|&n| self.graph[n].clone()).collect();
                names.sort();
                names
            })
            .collect()
    }

    /// Module names, dependencies before dependents (cycle members grouped)
    pub fn topological_order(&self) -> Vec<String> {
        let result = detect_sccs(&self.graph);
        result
            .components()
            .iter()
            .flat_map(|c| c.members.iter().map(|&n| self.graph[n].clone()))
            .collect()
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles().is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}
