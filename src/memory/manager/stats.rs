/*!
 * Memory Statistics and Consistency Checks
 */

use super::super::types::{Block, MemoryError, MemoryResult, MemorySnapshot, MemoryStats};
use super::{BlockList, MemoryManager};
use crate::core::types::Size;
use tracing::error;

impl MemoryManager {
    /// Get memory info as (total, used, available)
    pub fn info(&self) -> (Size, Size, Size) {
        (self.max_size, self.used, self.available())
    }

    #[inline]
    pub fn available(&self) -> Size {
        self.max_size - self.used
    }

    /// Length of the largest single free block (0 if none)
    pub fn largest_free_block(&self) -> Size {
        self.free.iter().map(|block| block.length).max().unwrap_or(0)
    }

    pub fn stats(&self) -> MemoryStats {
        let available = self.available();
        let largest_free_block = self.largest_free_block();
        let usage_percentage = if self.max_size == 0 {
            0.0
        } else {
            (self.used as f64 / self.max_size as f64) * 100.0
        };
        let fragmentation = if available == 0 {
            0.0
        } else {
            1.0 - largest_free_block as f64 / available as f64
        };

        MemoryStats {
            total_memory: self.max_size,
            used_memory: self.used,
            available_memory: available,
            usage_percentage,
            allocated_blocks: self.allocated.len(),
            free_blocks: self.free.len(),
            largest_free_block,
            fragmentation,
        }
    }

    /// Copy both registries in their current order
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            max_size: self.max_size,
            free: self.free.to_vec(),
            allocated: self.allocated.to_vec(),
        }
    }

    /// Rebuild a manager from a snapshot, rejecting inconsistent ones
    pub fn restore(snapshot: MemorySnapshot) -> MemoryResult<Self> {
        let used = total_length(&snapshot.allocated).ok_or_else(|| {
            error!("Allocated lengths exceed the address space");
            MemoryError::CorruptionDetected {
                address: 0,
                reason: "allocated lengths overflow".to_string(),
            }
        })?;
        let manager = Self {
            free: snapshot.free.into_iter().collect::<BlockList>(),
            allocated: snapshot.allocated.into_iter().collect::<BlockList>(),
            max_size: snapshot.max_size,
            used,
        };
        manager.verify()?;
        Ok(manager)
    }

    /// Check that the registries partition `[0, max_size)` exactly
    ///
    /// Verifies positive lengths, no overlap between any two blocks in either
    /// registry, no gaps, and a usage counter matching the allocated registry.
    pub fn verify(&self) -> MemoryResult<()> {
        let corrupt = |address: usize, reason: &str| -> MemoryResult<()> {
            error!(address, reason, "Memory registry corruption detected");
            Err(MemoryError::CorruptionDetected {
                address,
                reason: reason.to_string(),
            })
        };

        let mut blocks: Vec<Block> = self
            .free
            .iter()
            .chain(self.allocated.iter())
            .copied()
            .collect();
        if let Some(block) = blocks.iter().find(|block| block.length == 0) {
            return corrupt(block.base, "zero-length block");
        }

        blocks.sort_by_key(|block| block.base);
        let mut expected = 0;
        for block in &blocks {
            if block.base < expected {
                return corrupt(block.base, "overlapping blocks");
            }
            if block.base > expected {
                return corrupt(expected, "address range not covered by any block");
            }
            expected = match block.checked_end() {
                Some(end) => end,
                None => return corrupt(block.base, "block extends past the address space"),
            };
        }
        if expected != self.max_size {
            return corrupt(expected, "registries do not end at the managed size");
        }

        if total_length(self.allocated.iter()) != Some(self.used) {
            return corrupt(0, "usage counter out of sync with allocated registry");
        }

        Ok(())
    }
}

fn total_length<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Option<Size> {
    blocks
        .into_iter()
        .try_fold(0, |total: Size, block| total.checked_add(block.length))
}
