/*!
 * Shared Memory Manager
 * Mutex-guarded handle for callers that need one manager across threads
 */

use super::super::traits::{Allocator, Defragmenter, MemoryInfo};
use super::super::types::{DefragReport, MemoryResult, MemorySnapshot, MemoryStats};
use super::MemoryManager;
use crate::core::types::{Address, Size};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle serializing every call through one lock
///
/// Each operation holds the lock for its whole duration, so calls behave as
/// if issued one after another from a single thread.
#[derive(Debug, Clone)]
pub struct SharedMemoryManager {
    inner: Arc<Mutex<MemoryManager>>,
}

impl SharedMemoryManager {
    pub fn new(manager: MemoryManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Run `f` with exclusive access, e.g. to defragment and retry atomically
    pub fn with<R>(&self, f: impl FnOnce(&mut MemoryManager) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn allocate(&self, length: Size) -> MemoryResult<Address> {
        self.inner.lock().allocate(length)
    }

    pub fn release(&self, address: Address) -> MemoryResult<()> {
        self.inner.lock().release(address)
    }

    pub fn defragment(&self) -> DefragReport {
        self.inner.lock().defragment()
    }

    pub fn describe(&self) -> String {
        self.inner.lock().describe()
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        self.inner.lock().snapshot()
    }
}

impl Allocator for SharedMemoryManager {
    fn allocate(&mut self, length: Size) -> MemoryResult<Address> {
        SharedMemoryManager::allocate(self, length)
    }

    fn release(&mut self, address: Address) -> MemoryResult<()> {
        SharedMemoryManager::release(self, address)
    }

    fn is_allocated(&self, address: Address) -> bool {
        self.inner.lock().is_allocated(address)
    }

    fn block_size(&self, address: Address) -> Option<Size> {
        self.inner.lock().block_size(address)
    }
}

impl MemoryInfo for SharedMemoryManager {
    fn stats(&self) -> MemoryStats {
        self.inner.lock().stats()
    }

    fn info(&self) -> (Size, Size, Size) {
        self.inner.lock().info()
    }
}

impl Defragmenter for SharedMemoryManager {
    fn defragment(&mut self) -> DefragReport {
        SharedMemoryManager::defragment(self)
    }
}

impl From<MemoryManager> for SharedMemoryManager {
    fn from(manager: MemoryManager) -> Self {
        Self::new(manager)
    }
}
