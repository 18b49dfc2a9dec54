//! Configuration validation
//!
//! Configs implement [`Validatable`]; constructors call `validate()` so an
//! invalid object never reaches the analysis driver.

use super::error::ConfigResult;

/// Trait for validatable configuration objects
///
/// # Example
/// ```rust,ignore
/// fn build_engine<C: Validatable>(config: C) -> Result<Engine, ConfigError> {
///     config.validate()?;
///     // ... build engine
/// }
/// ```
pub trait Validatable {
    /// Validate the configuration
    ///
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Get the configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}
