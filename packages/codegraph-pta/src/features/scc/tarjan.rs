//! Strongly Connected Component Detection
//!
//! Tarjan's algorithm with an explicit frame stack, so deep call chains
//! cannot overflow the native stack.
//!
//! Components are emitted in finishing order. For a caller → callee graph
//! that is callees first, which is the order the solver drains them in.
//!
//! # References
//! - Tarjan, R. "Depth-First Search and Linear Graph Algorithms" (1972)

use super::graph::DirectedGraph;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::min;
use std::hash::Hash;

/// One strongly connected component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component<N> {
    /// Member with the lowest discovery index (the DFS root of the component)
    pub rep: N,
    /// Members in stack-pop order
    pub members: Vec<N>,
    /// More than one member, or a single member with a self-loop
    pub is_cycle: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SccStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub component_count: usize,
    pub cycle_count: usize,
    pub largest_component: usize,
}

/// Result of SCC detection
#[derive(Debug, Clone)]
pub struct SccResult<N: Copy + Eq + Hash> {
    /// Components in finishing order
    components: Vec<Component<N>>,
    /// Node → index into `components`
    node_to_component: FxHashMap<N, usize>,
    pub stats: SccStats,
}

impl<N: Copy + Eq + Hash> SccResult<N> {
    /// Component representatives, callees first
    pub fn topo_and_collapsed_node_stack(&self) -> Vec<N> {
        self.components.iter().map(|c| c.rep).collect()
    }

    /// Members of the component represented by `rep`
    pub fn my_scc_nodes(&self, rep: N) -> &[N] {
        match self.node_to_component.get(&rep) {
            Some(&idx) if self.components[idx].rep == rep => &self.components[idx].members,
            _ => &[],
        }
    }

    pub fn components(&self) -> &[Component<N>] {
        &self.components
    }

    pub fn component_of(&self, node: N) -> Option<&Component<N>> {
        self.node_to_component
            .get(&node)
            .map(|&idx| &self.components[idx])
    }

    /// Position of `node`'s component in the topological stack
    pub fn position_of(&self, node: N) -> Option<usize> {
        self.node_to_component.get(&node).copied()
    }

    pub fn representative(&self, node: N) -> Option<N> {
        self.component_of(node).map(|c| c.rep)
    }

    pub fn is_in_cycle(&self, node: N) -> bool {
        self.component_of(node).map(|c| c.is_cycle).unwrap_or(false)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

struct Frame<N> {
    node: N,
    succs: Vec<N>,
    next: usize,
}

enum Step<N> {
    Descend(N),
    Finish,
}

/// Detect all strongly connected components of `graph`
///
/// Time: O(V + E)
/// Space: O(V)
pub fn detect_sccs<G: DirectedGraph>(graph: &G) -> SccResult<G::Node> {
    let nodes = graph.node_ids();

    let mut index: FxHashMap<G::Node, usize> = FxHashMap::default();
    let mut lowlink: FxHashMap<G::Node, usize> = FxHashMap::default();
    let mut on_stack: FxHashSet<G::Node> = FxHashSet::default();
    let mut self_loops: FxHashSet<G::Node> = FxHashSet::default();
    let mut stack: Vec<G::Node> = Vec::new();
    let mut next_index = 0usize;
    let mut total_edges = 0usize;

    let mut components: Vec<Component<G::Node>> = Vec::new();
    let mut node_to_component: FxHashMap<G::Node, usize> = FxHashMap::default();

    for root in nodes.iter().copied() {
        if index.contains_key(&root) {
            continue;
        }

        let mut frames: Vec<Frame<G::Node>> = Vec::new();
        let mut pending = Some(root);

        loop {
            if let Some(v) = pending.take() {
                index.insert(v, next_index);
                lowlink.insert(v, next_index);
                next_index += 1;
                stack.push(v);
                on_stack.insert(v);

                let succs = graph.successors(v);
                total_edges += succs.len();
                if succs.contains(&v) {
                    self_loops.insert(v);
                }
                frames.push(Frame {
                    node: v,
                    succs,
                    next: 0,
                });
            }

            let step = match frames.last_mut() {
                None => break,
                Some(frame) => {
                    let mut step = Step::Finish;
                    while frame.next < frame.succs.len() {
                        let w = frame.succs[frame.next];
                        frame.next += 1;
                        if !index.contains_key(&w) {
                            step = Step::Descend(w);
                            break;
                        }
                        if on_stack.contains(&w) {
                            let low = min(lowlink[&frame.node], index[&w]);
                            lowlink.insert(frame.node, low);
                        }
                    }
                    step
                }
            };

            match step {
                Step::Descend(w) => pending = Some(w),
                Step::Finish => {
                    let Some(frame) = frames.pop() else { break };
                    let v = frame.node;
                    if let Some(parent) = frames.last() {
                        let low = min(lowlink[&parent.node], lowlink[&v]);
                        lowlink.insert(parent.node, low);
                    }

                    if lowlink[&v] == index[&v] {
                        let comp_idx = components.len();
                        let mut members = Vec::new();
                        while let Some(w) = stack.pop() {
                            on_stack.remove(&w);
                            node_to_component.insert(w, comp_idx);
                            members.push(w);
                            if w == v {
                                break;
                            }
                        }
                        let is_cycle = members.len() > 1 || self_loops.contains(&v);
                        components.push(Component {
                            rep: v,
                            members,
                            is_cycle,
                        });
                    }
                }
            }
        }
    }

    let stats = SccStats {
        total_nodes: nodes.len(),
        total_edges,
        component_count: components.len(),
        cycle_count: components.iter().filter(|c| c.is_cycle).count(),
        largest_component: components.iter().map(|c| c.members.len()).max().unwrap_or(0),
    };

    SccResult {
        components,
        node_to_component,
        stats,
    }
}
