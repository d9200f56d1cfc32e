/*!
 * Memory Types
 * Common types for memory management
 */

use crate::core::limits::{
    CRITICAL_PRESSURE_THRESHOLD, HIGH_PRESSURE_THRESHOLD, MEDIUM_PRESSURE_THRESHOLD,
};
use crate::core::types::{Address, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
///
/// Every failing operation leaves both registries untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MemoryError {
    #[error("Invalid allocation request: length {length} must be positive")]
    #[diagnostic(
        code(memory::invalid_request),
        help("Request at least one word.")
    )]
    InvalidRequest { length: Size },

    #[error("Out of memory: requested {requested} words, largest free block {largest_free} words ({available} words free in total)")]
    #[diagnostic(
        code(memory::out_of_memory),
        help("Free space may be fragmented. Call defragment() and retry.")
    )]
    OutOfMemory {
        requested: Size,
        largest_free: Size,
        available: Size,
    },

    #[error("Nothing is allocated")]
    #[diagnostic(code(memory::nothing_allocated))]
    NothingAllocated,

    #[error("No allocated block at address {0}")]
    #[diagnostic(
        code(memory::unknown_address),
        help("Release takes the base address returned by allocate().")
    )]
    UnknownAddress(Address),

    #[error("Memory corruption detected at {address}: {reason}")]
    #[diagnostic(code(memory::corruption))]
    CorruptionDetected { address: Address, reason: String },
}

/// A contiguous address range `[base, base + length)`
///
/// Rendered as `(base, length)`; the manager's `describe()` output is built
/// from this form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub base: Address,
    pub length: Size,
}

impl Block {
    pub const fn new(base: Address, length: Size) -> Self {
        Self { base, length }
    }

    /// First address past the end of the block
    #[inline]
    pub const fn end(&self) -> Address {
        self.base + self.length
    }

    /// `end()` for blocks of unknown origin; `None` past the address space
    #[inline]
    pub const fn checked_end(&self) -> Option<Address> {
        self.base.checked_add(self.length)
    }

    /// True when `next` starts exactly where this block ends
    #[inline]
    pub const fn is_adjacent_to(&self, next: &Block) -> bool {
        matches!(self.checked_end(), Some(end) if end == next.base)
    }

    #[inline]
    pub const fn contains(&self, address: Address) -> bool {
        address >= self.base && address - self.base < self.length
    }

    #[inline]
    pub const fn overlaps(&self, other: &Block) -> bool {
        if self.base <= other.base {
            other.length > 0 && other.base - self.base < self.length
        } else {
            self.length > 0 && self.base - other.base < other.length
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.base, self.length)
    }
}

/// Memory statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_memory: Size,
    pub used_memory: Size,
    pub available_memory: Size,
    pub usage_percentage: f64,
    pub allocated_blocks: usize,
    pub free_blocks: usize,
    pub largest_free_block: Size,
    /// Share of free memory outside the largest free block (0.0 = none)
    pub fragmentation: f64,
}

impl MemoryStats {
    pub fn memory_pressure(&self) -> MemoryPressure {
        MemoryPressure::from_usage(self.usage_percentage / 100.0)
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    /// Classify a usage ratio in `[0.0, 1.0]`
    pub fn from_usage(ratio: f64) -> Self {
        if ratio >= CRITICAL_PRESSURE_THRESHOLD {
            MemoryPressure::Critical
        } else if ratio >= HIGH_PRESSURE_THRESHOLD {
            MemoryPressure::High
        } else if ratio >= MEDIUM_PRESSURE_THRESHOLD {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Outcome of a defragmentation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefragReport {
    pub blocks_before: usize,
    pub blocks_after: usize,
}

impl DefragReport {
    /// Number of blocks absorbed into a neighbour
    pub fn merged(&self) -> usize {
        self.blocks_before.saturating_sub(self.blocks_after)
    }
}

/// Point-in-time copy of both registries, in registry order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub max_size: Size,
    pub free: Vec<Block>,
    pub allocated: Vec<Block>,
}
