//! Shared module - IR input model consumed by every feature
//!
//! Nothing in here depends on analysis state.

pub mod models;

pub use models::ir;
pub use models::*;
