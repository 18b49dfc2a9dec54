//! # Context-Sensitive Points-to Analysis
//!
//! Inclusion-based pointer analysis over the PAG with an on-the-fly call
//! graph:
//! - **Difference propagation**: only newly gained objects flow along edges
//! - **k-limited call strings**: contexts keep the last `k` call sites
//! - **SCC-aware scheduling**: dirty nodes drain callees-first by call-graph
//!   component; recursive components share a pop cap
//!
//! ## References
//! - Andersen, L. O. "Program Analysis and Specialization for C" (PhD 1994)
//! - Sridharan & Bodík "Refinement-Based Context-Sensitive Points-To Analysis for Java" (PLDI 2006)
//! - Hardekopf & Lin "The Ant and the Grasshopper" (PLDI 2007)
//!
//! ## Usage
//! ```text
//! use codegraph_pta::features::points_to::PointerAnalysis;
//!
//! let mut analysis = PointerAnalysis::new(&program, config)?;
//! analysis.set_entries(&[main])?;
//! analysis.start()?;
//! assert!(analysis.may_alias((main, "x"), (main, "y")));
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::PointerAnalysis;
#[cfg(feature = "parallel")]
pub use application::analyze_entry_sets_parallel;
pub use domain::{AnalysisStats, ContextId, ContextTable, Diagnostic, PointsToSet, EMPTY_CONTEXT};
pub use infrastructure::CancelHandle;
pub use ports::{PointsToQuery, SolverObserver};
