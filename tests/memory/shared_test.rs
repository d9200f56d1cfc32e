/*!
 * Shared Manager Tests
 * Serialized access to one manager from several threads
 */

use memspace::memory::{MemoryInfo, MemoryManager, SharedMemoryManager};
use std::thread;

#[test]
fn test_concurrent_allocations_stay_consistent() {
    let shared = SharedMemoryManager::new(MemoryManager::with_capacity(4096));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    let addr = shared.allocate(8).unwrap();
                    shared.release(addr).unwrap();
                }
                shared.allocate(16).unwrap()
            })
        })
        .collect();

    let mut kept: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    kept.sort_unstable();
    kept.dedup();
    assert_eq!(kept.len(), 4);

    let (total, used, _) = shared.info();
    assert_eq!((total, used), (4096, 64));
    assert!(shared.with(|mem| mem.verify()).is_ok());
}

#[test]
fn test_defragment_and_retry_under_one_lock() {
    let shared = SharedMemoryManager::from(MemoryManager::with_capacity(20));
    let a = shared.allocate(10).unwrap();
    let b = shared.allocate(10).unwrap();
    shared.release(b).unwrap();
    shared.release(a).unwrap();
    assert!(shared.allocate(20).is_err());

    let addr = shared.with(|mem| {
        mem.defragment();
        mem.allocate(20)
    });
    assert_eq!(addr, Ok(0));
    assert_eq!(shared.describe(), "\n(0, 20)");
    assert_eq!(shared.snapshot().allocated.len(), 1);
}
