//! Configuration for pointer analysis runs
//!
//! ```rust,ignore
//! use codegraph_pta::config::PointerAnalysisConfig;
//!
//! // Programmatic
//! let config = PointerAnalysisConfig::new(2, "out", false, true)?;
//!
//! // YAML (v1 schema)
//! let config = PointerAnalysisConfig::from_yaml("pta.yaml")?;
//! ```

pub mod error;
pub mod pta_config;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use pta_config::{PointerAnalysisConfig, DEFAULT_SCC_ITERATION_CAP, MAX_CONTEXT_DEPTH};
pub use validation::Validatable;
