//! Error types for codegraph-pta
//!
//! Only configuration and API misuse surface as errors. Analysis-time
//! problems (unresolved references, runaway recursion, exhausted budgets)
//! are recovered locally and reported as diagnostics instead.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for codegraph-pta operations
#[derive(Debug, Error)]
pub enum PtaError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Entry method not present in the program
    #[error("Unknown entry method id {0}")]
    UnknownEntry(u32),

    /// Call-site id that was never registered
    #[error("Unknown call site id {0}")]
    UnknownCallSite(u32),

    /// Call-site used for an edge whose caller does not own it
    #[error("Call site {site} belongs to node {owner}, not to caller {caller}")]
    ForeignCallSite { site: u32, owner: u32, caller: u32 },

    /// Call-graph node id out of range
    #[error("Unknown call graph node {0}")]
    UnknownNode(u32),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PtaError {
    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        PtaError::Config(ConfigError::Custom(msg.into()))
    }
}

/// Result type alias for codegraph-pta operations
pub type PtaResult<T> = std::result::Result<T, PtaError>;
