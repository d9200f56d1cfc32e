/*!
 * Registry Invariant Tests
 * Random operation sequences must preserve coverage and conservation
 */

use memspace::memory::{Block, MemoryError, MemoryManager};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Allocate(usize),
    // Index into the currently allocated blocks (modulo their count)
    Release(usize),
    ReleaseUnknown(usize),
    Defragment,
}

fn op_strategy(max_size: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..=max_size / 2).prop_map(Op::Allocate),
        3 => any::<usize>().prop_map(Op::Release),
        1 => any::<usize>().prop_map(Op::ReleaseUnknown),
        1 => Just(Op::Defragment),
    ]
}

fn assert_partition(mem: &MemoryManager) {
    let mut blocks: Vec<Block> = mem
        .free_blocks()
        .iter()
        .chain(mem.allocated_blocks().iter())
        .copied()
        .collect();
    blocks.sort_by_key(|b| b.base);

    let mut cursor = 0;
    for block in &blocks {
        assert!(block.length > 0, "zero-length block {}", block);
        assert_eq!(block.base, cursor, "gap or overlap at {}", block);
        cursor = block.end();
    }
    assert_eq!(cursor, mem.capacity());

    let total: usize = blocks.iter().map(|b| b.length).sum();
    assert_eq!(total, mem.capacity());

    let (_, used, available) = mem.info();
    assert_eq!(used + available, mem.capacity());
}

proptest! {
    #[test]
    fn prop_registries_partition_address_space(
        max_size in 1usize..512,
        ops in prop::collection::vec(op_strategy(512), 0..200),
    ) {
        let mut mem = MemoryManager::with_capacity(max_size);

        for op in ops {
            let before = mem.snapshot();
            match op {
                Op::Allocate(length) => match mem.allocate(length) {
                    Ok(address) => {
                        prop_assert!(mem.is_allocated(address));
                        prop_assert_eq!(mem.block_size(address), Some(length));
                    }
                    Err(MemoryError::InvalidRequest { .. }) => {
                        prop_assert_eq!(length, 0);
                        prop_assert_eq!(mem.snapshot(), before);
                    }
                    Err(MemoryError::OutOfMemory { largest_free, .. }) => {
                        prop_assert!(largest_free < length);
                        prop_assert_eq!(mem.snapshot(), before);
                    }
                    Err(e) => prop_assert!(false, "unexpected error {}", e),
                },
                Op::Release(pick) => {
                    let live = mem.allocated_blocks().to_vec();
                    if live.is_empty() {
                        prop_assert_eq!(mem.release(0), Err(MemoryError::NothingAllocated));
                    } else {
                        let block = live[pick % live.len()];
                        prop_assert_eq!(mem.release(block.base), Ok(()));
                        prop_assert_eq!(mem.free_blocks().last(), Some(&block));
                    }
                }
                Op::ReleaseUnknown(address) => {
                    if !mem.is_allocated(address) {
                        prop_assert!(mem.release(address).is_err());
                        prop_assert_eq!(mem.snapshot(), before);
                    }
                }
                Op::Defragment => {
                    mem.defragment();
                    let free = mem.free_blocks().to_vec();
                    for pair in free.windows(2) {
                        prop_assert!(pair[0].end() < pair[1].base);
                    }
                    prop_assert_eq!(mem.allocated_blocks().to_vec(), before.allocated);
                }
            }

            assert_partition(&mem);
            prop_assert!(mem.verify().is_ok());
        }
    }

    #[test]
    fn prop_first_fit_picks_earliest_sufficient_block(
        lengths in prop::collection::vec(1usize..32, 1..16),
        request in 1usize..32,
    ) {
        let max_size: usize = lengths.iter().sum();
        let mut mem = MemoryManager::with_capacity(max_size);
        let addrs: Vec<usize> = lengths.iter().map(|&l| mem.allocate(l).unwrap()).collect();
        // Free every other block, in reverse order, to scramble the free registry
        for addr in addrs.iter().step_by(2).rev() {
            mem.release(*addr).unwrap();
        }

        let expected = mem
            .free_blocks()
            .iter()
            .find(|b| b.length >= request)
            .map(|b| b.base);

        match expected {
            Some(base) => prop_assert_eq!(mem.allocate(request), Ok(base)),
            None => {
                let is_oom = matches!(mem.allocate(request), Err(MemoryError::OutOfMemory { .. }));
                prop_assert!(is_oom);
            }
        }
    }
}
