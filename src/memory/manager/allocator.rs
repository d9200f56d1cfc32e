/*!
 * Memory Allocator Implementation
 * Allocation and release logic
 */

use super::super::types::{Block, MemoryError, MemoryPressure, MemoryResult};
use super::MemoryManager;
use crate::core::types::{Address, Size};
use tracing::{debug, warn};

impl MemoryManager {
    /// Allocate `length` words using first-fit
    ///
    /// Scans the free registry in its current order and takes the first block
    /// with room. An exact fit removes the block; otherwise the block is
    /// shrunk from the front and its tail stays free. Fails without side
    /// effects when `length` is zero or no single block is large enough.
    pub fn allocate(&mut self, length: Size) -> MemoryResult<Address> {
        if length == 0 {
            warn!("Rejected zero-length allocation request");
            return Err(MemoryError::InvalidRequest { length });
        }

        let Some(id) = self.free.find(|block| block.length >= length) else {
            let largest_free = self.largest_free_block();
            let available = self.available();
            warn!(
                requested = length,
                largest_free,
                available,
                free_blocks = self.free.len(),
                "OOM: no free block large enough"
            );
            return Err(MemoryError::OutOfMemory {
                requested: length,
                largest_free,
                available,
            });
        };

        let Some(block) = self.free.get_node_mut(id) else {
            return Err(MemoryError::CorruptionDetected {
                address: 0,
                reason: "free registry handle vanished during allocation".to_string(),
            });
        };

        let address = block.base;
        let found_length = block.length;
        if found_length == length {
            self.free.remove_node(id);
        } else {
            // Split: keep the tail of the block free
            block.base += length;
            block.length -= length;
        }

        self.allocated.push_back(Block::new(address, length));
        self.used += length;

        let pressure = self.check_memory_pressure();
        if pressure >= MemoryPressure::High {
            warn!(
                address,
                length,
                used = self.used,
                total = self.max_size,
                "Memory pressure {}",
                pressure
            );
        } else {
            debug!(
                address,
                length,
                found_length,
                split = found_length != length,
                "Allocated block"
            );
        }

        Ok(address)
    }

    /// Release the allocation whose base address is `address`
    ///
    /// The block moves unchanged to the tail of the free registry. No
    /// coalescing happens here; that is `defragment`'s job.
    pub fn release(&mut self, address: Address) -> MemoryResult<()> {
        if self.allocated.is_empty() {
            warn!(address, "Attempted release with nothing allocated");
            return Err(MemoryError::NothingAllocated);
        }

        let block = self
            .allocated
            .find(|block| block.base == address)
            .and_then(|id| self.allocated.remove_node(id));

        let Some(block) = block else {
            warn!(address, "Attempted to release unknown address");
            return Err(MemoryError::UnknownAddress(address));
        };

        self.free.push_back(block);
        self.used = self.used.saturating_sub(block.length);

        debug!(
            address,
            length = block.length,
            free_blocks = self.free.len(),
            "Released block to free registry"
        );
        Ok(())
    }

    /// Check if an address is the base of a live allocation
    pub fn is_allocated(&self, address: Address) -> bool {
        self.allocated.iter().any(|block| block.base == address)
    }

    /// Get the size of an allocated block
    pub fn block_size(&self, address: Address) -> Option<Size> {
        self.allocated
            .iter()
            .find(|block| block.base == address)
            .map(|block| block.length)
    }

    pub(super) fn check_memory_pressure(&self) -> MemoryPressure {
        if self.max_size == 0 {
            return MemoryPressure::Low;
        }
        MemoryPressure::from_usage(self.used as f64 / self.max_size as f64)
    }
}
