//! Application layer: the analysis driver and parallel runs

pub mod analysis;
#[cfg(feature = "parallel")]
pub mod parallel;

pub use analysis::PointerAnalysis;
#[cfg(feature = "parallel")]
pub use parallel::analyze_entry_sets_parallel;
