//! SCC detection over any directed graph
//!
//! Used by the solver over the live call graph and by hosts over module
//! dependency graphs.

mod dependency_cycles;
mod graph;
mod tarjan;

pub use dependency_cycles::ModuleDependencyGraph;
pub use graph::DirectedGraph;
pub use tarjan::{detect_sccs, Component, SccResult, SccStats};
