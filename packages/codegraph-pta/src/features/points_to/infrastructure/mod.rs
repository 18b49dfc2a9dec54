//! Points-to solver infrastructure

pub mod cancel;
mod dispatch;
pub mod solver;
pub mod wave_worklist;

pub use cancel::CancelHandle;
pub use solver::Solver;
pub use wave_worklist::WaveWorklist;
