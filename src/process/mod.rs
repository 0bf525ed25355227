/*!
 * Process Module
 * Process descriptors, the process table and process stacks
 */

pub mod stack;
pub mod table;
pub mod types;

// Re-export for convenience
pub use stack::{StackArena, StackPointer};
pub use table::ProcessTable;
pub use types::{Process, ProcessResult, ProcessState};
