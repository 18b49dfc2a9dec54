//! Ports (Interfaces) for Points-to Analysis
//!
//! - [`SolverObserver`]: hooks into solver progress (tests, tracing hosts)
//! - [`PointsToQuery`]: read side consumed by downstream analyses

use crate::features::call_graph::CallGraphEdge;
use crate::features::pag::PagNodeId;
use crate::features::points_to::domain::PointsToSet;
use crate::shared::models::MethodId;

/// Observer notified as the solver makes progress
///
/// All methods default to no-ops.
pub trait SolverObserver: Send {
    /// `node` gained the objects in `added`
    fn on_points_to_grow(&mut self, _node: PagNodeId, _added: &PointsToSet) {}

    /// A new call-graph edge was inserted
    fn on_call_edge(&mut self, _edge: &CallGraphEdge) {}

    /// A recursive component was frozen
    fn on_component_frozen(&mut self, _methods: &[MethodId]) {}
}

/// Read-only points-to queries
///
/// # Example
/// ```ignore
/// fn shares_heap<Q: PointsToQuery>(q: &Q, m: MethodId) -> bool {
///     q.may_alias((m, "a"), (m, "b"))
/// }
/// ```
pub trait PointsToQuery {
    /// Objects a local may point to, merged over all contexts
    fn points_to_of_local(&self, method: MethodId, name: &str) -> PointsToSet;

    /// Whether two locals may reference a common object
    fn may_alias(&self, a: (MethodId, &str), b: (MethodId, &str)) -> bool {
        self.points_to_of_local(a.0, a.1)
            .intersects(&self.points_to_of_local(b.0, b.1))
    }
}
