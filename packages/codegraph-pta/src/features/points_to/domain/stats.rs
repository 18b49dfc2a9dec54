use serde::{Deserialize, Serialize};

/// Counters for one analysis run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub pag_nodes: usize,
    pub pag_edges: usize,
    pub contexts: usize,
    /// Instantiated `(method, context)` pairs
    pub method_instances: usize,
    pub call_graph_nodes: usize,
    pub call_graph_edges: usize,
    pub worklist_pops: u64,
    pub passes: usize,
    pub scc_recomputations: usize,
    pub frozen_components: usize,
    pub max_points_to_size: usize,
    pub total_points_to_size: usize,
    pub diagnostics: usize,
    /// False when the run stopped early (budget or cancellation)
    pub reached_fixpoint: bool,
    pub elapsed_ms: u64,
}
