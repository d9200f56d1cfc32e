/*!
 * Memory Management
 *
 * First-fit allocator over a fixed address range `[0, max_size)`.
 *
 * ## Registries
 *
 * - **Free registry**: blocks not handed out, in release order until a
 *   defragmentation pass sorts and coalesces them
 * - **Allocated registry**: one block per outstanding allocation, keyed by
 *   its base address
 *
 * Between calls the two registries partition `[0, max_size)` exactly: no
 * overlaps, no gaps, no zero-length blocks.
 *
 * ## Operations
 *
 * - **allocate**: first free block large enough wins; it is consumed whole or
 *   shrunk from the front
 * - **release**: the block moves unchanged to the tail of the free registry
 * - **defragment**: sort free blocks by address and merge adjacent runs,
 *   O(n log n) + O(n)
 *
 * The manager is single-threaded (`&mut self`). Wrap it in a
 * `SharedMemoryManager` to share it across threads.
 */

mod allocator;
pub mod block_list;
mod defrag;
mod shared;
mod stats;

pub use block_list::{BlockList, Iter, NodeId};
pub use defrag::coalesce;
pub use shared::SharedMemoryManager;

use super::traits::{Allocator, Defragmenter, MemoryInfo};
use super::types::{Block, DefragReport, MemoryResult, MemoryStats};
use crate::core::config::{ConfigError, MemSpaceConfig};
use crate::core::limits::DEFAULT_MEMORY_SPACE;
use crate::core::types::{Address, Size};
use std::fmt;
use tracing::info;

/// Memory manager
#[derive(Debug, Clone)]
pub struct MemoryManager {
    pub(super) free: BlockList,
    pub(super) allocated: BlockList,
    pub(super) max_size: Size,
    // Sum of allocated block lengths
    pub(super) used: Size,
}

impl MemoryManager {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_SPACE)
    }

    /// Create memory manager over `[0, max_size)`
    ///
    /// A zero-sized space starts with both registries empty.
    pub fn with_capacity(max_size: Size) -> Self {
        let mut free = BlockList::new();
        if max_size > 0 {
            free.push_back(Block::new(0, max_size));
        }
        info!(max_size, "Memory manager initialized with first-fit allocator");
        Self {
            free,
            allocated: BlockList::new(),
            max_size,
            used: 0,
        }
    }

    /// Create memory manager from validated configuration
    pub fn from_config(config: &MemSpaceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_capacity(config.max_size))
    }

    #[inline]
    pub fn capacity(&self) -> Size {
        self.max_size
    }

    /// Free blocks in registry order
    pub fn free_blocks(&self) -> &BlockList {
        &self.free
    }

    /// Allocated blocks in registry order
    pub fn allocated_blocks(&self) -> &BlockList {
        &self.allocated
    }

    /// Two-line rendering: free registry, then allocated registry
    ///
    /// Each line lists its blocks as `(base, length)` separated by single
    /// spaces; an empty registry renders as an empty line.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MemoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.free, self.allocated)
    }
}

// Implement trait interfaces
impl Allocator for MemoryManager {
    fn allocate(&mut self, length: Size) -> MemoryResult<Address> {
        MemoryManager::allocate(self, length)
    }

    fn release(&mut self, address: Address) -> MemoryResult<()> {
        MemoryManager::release(self, address)
    }

    fn is_allocated(&self, address: Address) -> bool {
        MemoryManager::is_allocated(self, address)
    }

    fn block_size(&self, address: Address) -> Option<Size> {
        MemoryManager::block_size(self, address)
    }
}

impl MemoryInfo for MemoryManager {
    fn stats(&self) -> MemoryStats {
        MemoryManager::stats(self)
    }

    fn info(&self) -> (Size, Size, Size) {
        MemoryManager::info(self)
    }
}

impl Defragmenter for MemoryManager {
    fn defragment(&mut self) -> DefragReport {
        MemoryManager::defragment(self)
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}
