/*!
 * Free Space Defragmentation
 * Sort-then-merge coalescing of the free registry
 */

use super::super::types::{Block, DefragReport};
use super::MemoryManager;
use tracing::{debug, info};

/// Sort blocks by base address and merge exactly adjacent runs
///
/// Bases must be unique (blocks never overlap). The result is ordered by base
/// address and no two of its blocks are adjacent.
pub fn coalesce(mut blocks: Vec<Block>) -> Vec<Block> {
    blocks.sort_by_key(|block| block.base);

    let mut merged: Vec<Block> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match merged.last_mut() {
            Some(candidate) if candidate.is_adjacent_to(&block) => {
                candidate.length += block.length;
            }
            _ => merged.push(block),
        }
    }
    merged
}

impl MemoryManager {
    /// Coalesce adjacent free blocks to reduce fragmentation
    ///
    /// Rebuilds the free registry in ascending address order with every run
    /// of touching blocks merged into one. The allocated registry is not
    /// touched. Safe to call at any time; repeated calls are no-ops.
    pub fn defragment(&mut self) -> DefragReport {
        let blocks_before = self.free.len();
        if blocks_before < 2 {
            return DefragReport {
                blocks_before,
                blocks_after: blocks_before,
            };
        }

        let merged = coalesce(self.free.to_vec());
        let report = DefragReport {
            blocks_before,
            blocks_after: merged.len(),
        };
        self.free.replace_all(merged);

        if report.merged() > 0 {
            info!(
                merged = report.merged(),
                before = report.blocks_before,
                after = report.blocks_after,
                "Coalesced adjacent free blocks"
            );
        } else {
            debug!(blocks = blocks_before, "Defragment found no adjacent free blocks");
        }

        report
    }
}
