//! Graph abstraction the SCC detector runs over

use crate::features::call_graph::{CallGraph, FuncId};
use petgraph::graph::{Graph, IndexType, NodeIndex};
use petgraph::{Directed, Direction};
use std::hash::Hash;

/// Minimal read-only view of a directed graph
pub trait DirectedGraph {
    type Node: Copy + Eq + Hash;

    /// All nodes, in a deterministic order
    fn node_ids(&self) -> Vec<Self::Node>;

    fn successors(&self, node: Self::Node) -> Vec<Self::Node>;
}

impl DirectedGraph for CallGraph {
    type Node = FuncId;

    fn node_ids(&self) -> Vec<FuncId> {
        (0..self.node_count() as FuncId).collect()
    }

    fn successors(&self, node: FuncId) -> Vec<FuncId> {
        self.callees(node)
    }
}

impl<N, E, Ix: IndexType> DirectedGraph for Graph<N, E, Directed, Ix> {
    type Node = NodeIndex<Ix>;

    fn node_ids(&self) -> Vec<NodeIndex<Ix>> {
        self.node_indices().collect()
    }

    fn successors(&self, node: NodeIndex<Ix>) -> Vec<NodeIndex<Ix>> {
        // petgraph yields neighbors newest-first
        let mut succs: Vec<_> = self.neighbors_directed(node, Direction::Outgoing).collect();
        succs.reverse();
        succs
    }
}
