/*!
 * Process Table
 * Fixed array of process slots, the single source of truth for process state
 */

use super::types::{Process, ProcessState};
use crate::core::limits::MAX_NUMBER_OF_PROCESSES;
use crate::core::types::ProcessId;

/// Process table with a runtime capacity of at most MAX_NUMBER_OF_PROCESSES
#[derive(Debug, Clone)]
pub struct ProcessTable {
    slots: [Process; MAX_NUMBER_OF_PROCESSES],
    capacity: usize,
}

impl ProcessTable {
    /// Create an all-unused table; capacity is clamped to the static limit
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: [Process::unused(); MAX_NUMBER_OF_PROCESSES],
            capacity: capacity.clamp(1, MAX_NUMBER_OF_PROCESSES),
        }
    }

    /// Number of usable slots
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mark every slot unused
    pub fn reset(&mut self) {
        self.slots = [Process::unused(); MAX_NUMBER_OF_PROCESSES];
    }

    /// Slot accessor; `None` outside the configured capacity
    #[inline]
    pub fn get(&self, pid: ProcessId) -> Option<&Process> {
        self.slots[..self.capacity].get(pid as usize)
    }

    #[inline]
    pub fn get_mut(&mut self, pid: ProcessId) -> Option<&mut Process> {
        self.slots[..self.capacity].get_mut(pid as usize)
    }

    /// State of a slot, `Unused` when out of range
    #[inline]
    pub fn state(&self, pid: ProcessId) -> ProcessState {
        self.get(pid).map(|p| p.state).unwrap_or_default()
    }

    /// Whether a strategy may pick this slot
    #[inline]
    pub fn is_runnable(&self, pid: ProcessId) -> bool {
        self.state(pid).is_runnable()
    }

    /// First unused slot, lowest index first
    pub fn first_unused(&self) -> Option<ProcessId> {
        self.iter()
            .find(|(_, p)| p.state == ProcessState::Unused)
            .map(|(pid, _)| pid)
    }

    /// Number of slots that are not unused
    pub fn active_count(&self) -> usize {
        self.iter().filter(|(_, p)| p.state.is_used()).count()
    }

    /// Slots within capacity together with their IDs
    pub fn iter(&self) -> impl Iterator<Item = (ProcessId, &Process)> + '_ {
        self.slots[..self.capacity]
            .iter()
            .enumerate()
            .map(|(pid, p)| (pid as ProcessId, p))
    }

    /// IDs of runnable slots in ascending order
    pub fn runnable(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.iter()
            .filter(|(_, p)| p.is_runnable())
            .map(|(pid, _)| pid)
    }

    /// Snapshot of the used part of the table
    pub fn as_slice(&self) -> &[Process] {
        &self.slots[..self.capacity]
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new(MAX_NUMBER_OF_PROCESSES)
    }
}
