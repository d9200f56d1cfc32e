/*!
 * Memspace Library
 * Simulated memory space with first-fit allocation and explicit defragmentation
 */

pub mod core;
pub mod driver;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use crate::core::config::{ConfigError, MemSpaceConfig};
pub use crate::core::types::{Address, Size};
pub use driver::{Command, DriverError, ParseCommandError, Session};
pub use memory::{
    Block, DefragReport, MemoryError, MemoryManager, MemoryResult, MemorySnapshot, MemoryStats,
    SharedMemoryManager,
};
pub use monitoring::init_tracing;
