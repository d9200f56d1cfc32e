/*!
 * Core Types
 * Common types used across the memory space
 */

/// Address type for memory operations
pub type Address = usize;

/// Size type for memory operations (measured in words)
pub type Size = usize;
