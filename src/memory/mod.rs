/*!
 * Memory Module
 * Address-space bookkeeping: free/allocated registries and the first-fit manager
 */

pub mod manager;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use manager::{coalesce, BlockList, MemoryManager, NodeId, SharedMemoryManager};
pub use traits::*;
pub use types::*;
