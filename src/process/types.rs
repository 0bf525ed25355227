/*!
 * Process Types
 * Process descriptors held by the process table
 */

use super::stack::StackPointer;
use crate::core::errors::ProcessError;
use crate::core::types::{Priority, ProgramId};
use serde::{Deserialize, Serialize};

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Slot is free
    #[default]
    Unused,
    /// Waiting for the processor
    Ready,
    /// Owns the processor
    Running,
    /// Parked; never picked by a strategy
    Blocked,
}

impl ProcessState {
    /// Whether a strategy may hand the processor to a process in this state
    #[inline(always)]
    pub const fn is_runnable(self) -> bool {
        matches!(self, Self::Ready | Self::Running)
    }

    /// Whether the slot is allocated
    #[inline(always)]
    pub const fn is_used(self) -> bool {
        !matches!(self, Self::Unused)
    }
}

/// One process slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Process {
    pub state: ProcessState,
    pub priority: Priority,
    pub program_id: ProgramId,
    /// Top of the saved context; stale while the process is running
    pub saved_sp: StackPointer,
}

impl Process {
    /// An unused slot
    pub const fn unused() -> Self {
        Self {
            state: ProcessState::Unused,
            priority: 0,
            program_id: 0,
            saved_sp: StackPointer::NULL,
        }
    }

    #[inline(always)]
    pub const fn is_runnable(&self) -> bool {
        self.state.is_runnable()
    }
}
