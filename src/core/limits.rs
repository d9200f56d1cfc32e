/*!
 * System Limits and Constants
 *
 * Centralized location for the defaults and thresholds used by the memory space.
 */

// =============================================================================
// MEMORY LIMITS
// =============================================================================

/// Default size of the managed memory space (1000 words)
/// Used when no explicit capacity is configured
pub const DEFAULT_MEMORY_SPACE: usize = 1000;

/// Upper bound accepted from configuration (1G words)
pub const MAX_MEMORY_SPACE: usize = 1024 * 1024 * 1024;

// =============================================================================
// MEMORY PRESSURE THRESHOLDS
// =============================================================================

/// Usage ratio at which pressure is reported as MEDIUM
pub const MEDIUM_PRESSURE_THRESHOLD: f64 = 0.60;

/// Usage ratio at which pressure is reported as HIGH
pub const HIGH_PRESSURE_THRESHOLD: f64 = 0.80;

/// Usage ratio at which pressure is reported as CRITICAL
pub const CRITICAL_PRESSURE_THRESHOLD: f64 = 0.95;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Overrides the managed memory size
pub const ENV_MAX_SIZE: &str = "MEMSPACE_MAX_SIZE";

/// Enables JSON trace output ("1" or "true")
pub const ENV_TRACE_JSON: &str = "MEMSPACE_TRACE_JSON";
