/*!
 * Allocation and Release Tests
 * First-fit selection, splitting, exact fits and error outcomes
 */

use memspace::memory::{Allocator, Block, MemoryError, MemoryManager, MemorySnapshot};
use pretty_assertions::assert_eq;

fn manager_with(max_size: usize, free: &[(usize, usize)], allocated: &[(usize, usize)]) -> MemoryManager {
    let to_blocks = |pairs: &[(usize, usize)]| {
        pairs
            .iter()
            .map(|&(base, length)| Block::new(base, length))
            .collect::<Vec<_>>()
    };
    MemoryManager::restore(MemorySnapshot {
        max_size,
        free: to_blocks(free),
        allocated: to_blocks(allocated),
    })
    .expect("test layout must partition the address space")
}

fn free_of(mem: &MemoryManager) -> Vec<(usize, usize)> {
    mem.free_blocks().iter().map(|b| (b.base, b.length)).collect()
}

fn allocated_of(mem: &MemoryManager) -> Vec<(usize, usize)> {
    mem.allocated_blocks().iter().map(|b| (b.base, b.length)).collect()
}

#[test]
fn test_new_manager_has_single_free_block() {
    let mem = MemoryManager::with_capacity(100);
    assert_eq!(free_of(&mem), vec![(0, 100)]);
    assert!(allocated_of(&mem).is_empty());
    assert_eq!(mem.capacity(), 100);
    assert_eq!(mem.describe(), "(0, 100)\n");
}

#[test]
fn test_default_capacity() {
    let mem = MemoryManager::default();
    assert_eq!(mem.capacity(), memspace::core::limits::DEFAULT_MEMORY_SPACE);
}

#[test]
fn test_sequential_allocations_are_contiguous() {
    let mut mem = MemoryManager::with_capacity(100);
    assert_eq!(mem.allocate(10), Ok(0));
    assert_eq!(mem.allocate(20), Ok(10));
    assert_eq!(mem.allocate(30), Ok(30));

    assert_eq!(free_of(&mem), vec![(60, 40)]);
    assert_eq!(allocated_of(&mem), vec![(0, 10), (10, 20), (30, 30)]);
    assert_eq!(mem.describe(), "(60, 40)\n(0, 10) (10, 20) (30, 30)");
}

#[test]
fn test_first_fit_prefers_earlier_block_over_tighter_fit() {
    let mut mem = manager_with(28, &[(0, 5), (10, 3), (20, 8)], &[(5, 5), (13, 7)]);

    assert_eq!(mem.allocate(3), Ok(0));
    assert_eq!(free_of(&mem), vec![(3, 2), (10, 3), (20, 8)]);
    assert_eq!(allocated_of(&mem), vec![(5, 5), (13, 7), (0, 3)]);
}

#[test]
fn test_exact_fit_removes_free_block() {
    let mut mem = manager_with(13, &[(10, 3)], &[(0, 10)]);

    assert_eq!(mem.allocate(3), Ok(10));
    assert!(free_of(&mem).is_empty());
    assert_eq!(allocated_of(&mem), vec![(0, 10), (10, 3)]);
    assert_eq!(mem.describe(), "\n(0, 10) (10, 3)");
}

#[test]
fn test_out_of_memory_leaves_state_unchanged() {
    let mut mem = manager_with(10, &[(0, 2)], &[(2, 8)]);
    let before = mem.snapshot();

    assert_eq!(
        mem.allocate(5),
        Err(MemoryError::OutOfMemory {
            requested: 5,
            largest_free: 2,
            available: 2,
        })
    );
    assert_eq!(mem.snapshot(), before);
}

#[test]
fn test_fragmented_space_fails_until_defragmented() {
    let mut mem = MemoryManager::with_capacity(30);
    let a = mem.allocate(10).unwrap();
    let b = mem.allocate(10).unwrap();
    mem.allocate(10).unwrap();
    mem.release(b).unwrap();
    mem.release(a).unwrap();

    // 20 words free in total, but as two separate 10-word blocks
    assert!(matches!(
        mem.allocate(20),
        Err(MemoryError::OutOfMemory { available: 20, largest_free: 10, .. })
    ));

    mem.defragment();
    assert_eq!(mem.allocate(20), Ok(0));
}

#[test]
fn test_zero_length_request_is_invalid() {
    let mut mem = MemoryManager::with_capacity(10);
    assert_eq!(mem.allocate(0), Err(MemoryError::InvalidRequest { length: 0 }));
    assert_eq!(free_of(&mem), vec![(0, 10)]);
}

#[test]
fn test_release_appends_to_free_tail() {
    let mut mem = MemoryManager::with_capacity(30);
    let a = mem.allocate(10).unwrap();
    let b = mem.allocate(10).unwrap();

    mem.release(a).unwrap();
    mem.release(b).unwrap();

    // Release order, not address order, and no merging
    assert_eq!(free_of(&mem), vec![(20, 10), (0, 10), (10, 10)]);
    assert!(allocated_of(&mem).is_empty());

    // First-fit now sees the blocks in release order
    assert_eq!(mem.allocate(5), Ok(20));
}

#[test]
fn test_release_with_nothing_allocated() {
    let mut mem = MemoryManager::with_capacity(10);
    assert_eq!(mem.release(0), Err(MemoryError::NothingAllocated));
}

#[test]
fn test_release_unknown_address() {
    let mut mem = MemoryManager::with_capacity(1000);
    mem.allocate(100).unwrap();
    let before = mem.describe();

    assert_eq!(mem.release(999), Err(MemoryError::UnknownAddress(999)));
    // Interior addresses do not identify a block either
    assert_eq!(mem.release(50), Err(MemoryError::UnknownAddress(50)));
    assert_eq!(mem.describe(), before);
}

#[test]
fn test_double_release_is_rejected() {
    let mut mem = MemoryManager::with_capacity(100);
    let a = mem.allocate(10).unwrap();
    mem.allocate(10).unwrap();

    mem.release(a).unwrap();
    assert_eq!(mem.release(a), Err(MemoryError::UnknownAddress(a)));
}

#[test]
fn test_allocate_release_round_trip_restores_free_ranges() {
    let mut mem = MemoryManager::with_capacity(64);
    mem.allocate(8).unwrap();
    let before = mem.free_blocks().to_vec();

    let a = mem.allocate(16).unwrap();
    mem.release(a).unwrap();

    let mut after = mem.free_blocks().to_vec();
    after.sort_by_key(|b| b.base);
    assert_eq!(after, vec![Block::new(8, 16), Block::new(24, 40)]);
    assert_eq!(memspace::memory::coalesce(after), before);
}

#[test]
fn test_trait_object_usage() {
    fn churn(allocator: &mut dyn Allocator) -> usize {
        let a = allocator.allocate(4).unwrap();
        let b = allocator.allocate(6).unwrap();
        allocator.release(a).unwrap();
        assert!(!allocator.is_allocated(a));
        allocator.block_size(b).unwrap()
    }

    let mut mem = MemoryManager::with_capacity(16);
    assert_eq!(churn(&mut mem), 6);
    assert_eq!(mem.info(), (16, 6, 10));
}

#[test]
fn test_errors_render_diagnostics() {
    let err = MemoryError::OutOfMemory {
        requested: 5,
        largest_free: 2,
        available: 3,
    };
    assert_eq!(
        err.to_string(),
        "Out of memory: requested 5 words, largest free block 2 words (3 words free in total)"
    );
    let code = miette::Diagnostic::code(&err).map(|c| c.to_string());
    assert_eq!(code.as_deref(), Some("memory::out_of_memory"));
}
