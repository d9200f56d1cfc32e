/*!
 * Memory Traits
 * Memory management abstractions
 */

use super::types::*;
use crate::core::types::{Address, Size};

/// Memory allocator interface
pub trait Allocator {
    /// Allocate `length` words, returning the base address
    fn allocate(&mut self, length: Size) -> MemoryResult<Address>;

    /// Release the block whose base address is `address`
    fn release(&mut self, address: Address) -> MemoryResult<()>;

    /// Check if an address is the base of a live allocation
    fn is_allocated(&self, address: Address) -> bool;

    /// Get the size of an allocated block
    fn block_size(&self, address: Address) -> Option<Size>;
}

/// Memory statistics provider
pub trait MemoryInfo {
    /// Get overall memory statistics
    fn stats(&self) -> MemoryStats;

    /// Get memory info as (total, used, available)
    fn info(&self) -> (Size, Size, Size);

    /// Get memory pressure level
    fn pressure(&self) -> MemoryPressure {
        self.stats().memory_pressure()
    }
}

/// Free-space coalescing
pub trait Defragmenter {
    fn defragment(&mut self) -> DefragReport;
}
