//! Call graph built on the fly by the pointer analysis
//!
//! Static calls are bound as soon as their caller becomes reachable; dynamic
//! and pointer calls gain edges as receivers gain abstract objects.

mod graph;
mod types;

pub use graph::CallGraph;
pub use types::{
    CallGraphEdge, CallGraphNode, CallGraphNodeKind, CallSite, CallSiteId, DispatchKind, FuncId,
};
