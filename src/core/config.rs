/*!
 * Memory Space Configuration
 *
 * Capacity and tracing options, loaded from defaults or the environment.
 */

use super::limits::{DEFAULT_MEMORY_SPACE, ENV_MAX_SIZE, ENV_TRACE_JSON, MAX_MEMORY_SPACE};
use super::types::Size;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Expected an unsigned integer for sizes and 1/0/true/false for flags.")
    )]
    InvalidValue { var: &'static str, value: String },

    #[error("Memory space size must be positive")]
    #[diagnostic(code(config::zero_capacity))]
    ZeroCapacity,

    #[error("Memory space size {requested} exceeds the maximum of {max}")]
    #[diagnostic(code(config::capacity_too_large))]
    CapacityTooLarge { requested: Size, max: Size },
}

/// Memory space configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemSpaceConfig {
    /// Size of the managed address range `[0, max_size)` (default: 1000)
    pub max_size: Size,

    /// Emit traces as JSON instead of compact text (default: false)
    pub trace_json: bool,
}

impl MemSpaceConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            max_size: DEFAULT_MEMORY_SPACE,
            trace_json: false,
        }
    }

    pub fn with_max_size(mut self, max_size: Size) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_trace_json(mut self, trace_json: bool) -> Self {
        self.trace_json = trace_json;
        self
    }

    /// Load configuration from process environment
    ///
    /// Environment variables:
    /// - MEMSPACE_MAX_SIZE: size of the managed range (default: 1000)
    /// - MEMSPACE_TRACE_JSON: enable JSON trace output (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(value) = lookup(ENV_MAX_SIZE) {
            config.max_size = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    var: ENV_MAX_SIZE,
                    value: value.clone(),
                })?;
        }

        if let Some(value) = lookup(ENV_TRACE_JSON) {
            config.trace_json = match value.trim() {
                "1" | "true" => true,
                "0" | "false" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: ENV_TRACE_JSON,
                        value,
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the manager cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.max_size > MAX_MEMORY_SPACE {
            return Err(ConfigError::CapacityTooLarge {
                requested: self.max_size,
                max: MAX_MEMORY_SPACE,
            });
        }
        Ok(())
    }
}

impl Default for MemSpaceConfig {
    fn default() -> Self {
        Self::new()
    }
}
