//! Domain layer - analysis state value types

pub mod context;
pub mod diagnostic;
pub mod points_to_set;
pub mod stats;

pub use context::{ContextId, ContextTable, EMPTY_CONTEXT};
pub use diagnostic::Diagnostic;
pub use points_to_set::PointsToSet;
pub use stats::AnalysisStats;
