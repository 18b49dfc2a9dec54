/*
 * Codegraph PTA - Context-Sensitive Points-to Analysis
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : IR input model (Program, Method, Stmt)
 * - features/    : call_graph, scc, pag, points_to, export
 * - config/      : Validated analysis configuration
 *
 * The solver builds the call graph on the fly while points-to sets grow.
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Call binding carries every operand
#![allow(clippy::type_complexity)] // Keyed memo tables
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional

pub mod config;
pub mod errors;
pub mod features;
pub mod shared;

pub use config::{ConfigError, PointerAnalysisConfig};
pub use errors::{PtaError, PtaResult};
pub use features::call_graph::{CallGraph, CallGraphEdge, CallSite, DispatchKind, FuncId};
pub use features::pag::{Pag, PagNodeId, PagNodeKind};
#[cfg(feature = "parallel")]
pub use features::points_to::analyze_entry_sets_parallel;
pub use features::points_to::{
    CancelHandle, Diagnostic, PointerAnalysis, PointsToQuery, PointsToSet, SolverObserver,
};
pub use features::scc::{detect_sccs, DirectedGraph, SccResult};
pub use shared::models::{MethodId, Program, ProgramBuilder};
