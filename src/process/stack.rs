/*!
 * Stack Arena
 *
 * Owned byte arena holding the scheduler/ISR stack and every process stack.
 * Stack pointers are indices into the arena, never raw addresses. Stacks
 * grow toward lower indices: a push writes at the pointer and then moves it
 * down, a pop moves it up and then reads.
 *
 * Layout (highest index first):
 *
 * ```text
 * STACK_ARENA_SIZE-1  +--------------------+  <- ISR stack bottom
 *                     |     ISR stack      |
 *                     +--------------------+  <- process 0 stack bottom
 *                     |  process 0 stack   |
 *                     +--------------------+  <- process 1 stack bottom
 *                     |        ...         |
 * 0                   +--------------------+
 * ```
 */

use crate::core::limits::{
    ISR_STACK_SIZE, MAX_NUMBER_OF_PROCESSES, PROCESS_STACK_SIZE, SAVED_CONTEXT_BYTES,
    STACK_ARENA_SIZE,
};
use crate::core::types::{ProcessId, StackChecksum};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index into the stack arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackPointer(usize);

impl StackPointer {
    /// Pointer of a slot that never had a stack
    pub const NULL: StackPointer = StackPointer(0);

    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline(always)]
    pub const fn as_index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StackPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Fixed-size stack memory shared by the scheduler and all processes
pub struct StackArena {
    bytes: [u8; STACK_ARENA_SIZE],
}

impl StackArena {
    pub const fn new() -> Self {
        Self {
            bytes: [0; STACK_ARENA_SIZE],
        }
    }

    /// First byte used by the dispatcher's own stack
    #[inline(always)]
    pub const fn isr_stack_bottom() -> StackPointer {
        StackPointer(STACK_ARENA_SIZE - 1)
    }

    /// First byte used by a process stack
    ///
    /// # Panics
    /// If `pid` is not below MAX_NUMBER_OF_PROCESSES
    #[inline(always)]
    pub const fn process_stack_bottom(pid: ProcessId) -> StackPointer {
        assert!((pid as usize) < MAX_NUMBER_OF_PROCESSES);
        StackPointer(STACK_ARENA_SIZE - 1 - ISR_STACK_SIZE - pid as usize * PROCESS_STACK_SIZE)
    }

    /// Lowest index that still belongs to a process stack
    #[inline(always)]
    pub const fn process_stack_limit(pid: ProcessId) -> StackPointer {
        StackPointer(Self::process_stack_bottom(pid).0 + 1 - PROCESS_STACK_SIZE)
    }

    #[inline]
    pub fn read(&self, sp: StackPointer) -> u8 {
        self.bytes[sp.0]
    }

    #[inline]
    pub fn write(&mut self, sp: StackPointer, byte: u8) {
        self.bytes[sp.0] = byte;
    }

    /// Store a byte and move the pointer down
    #[inline]
    pub fn push(&mut self, sp: &mut StackPointer, byte: u8) {
        self.bytes[sp.0] = byte;
        sp.0 -= 1;
    }

    /// Move the pointer up and load the byte there
    #[inline]
    pub fn pop(&self, sp: &mut StackPointer) -> u8 {
        sp.0 += 1;
        self.bytes[sp.0]
    }

    /// Whole private stack region of a process, lowest index first
    pub fn process_stack(&self, pid: ProcessId) -> &[u8] {
        let limit = Self::process_stack_limit(pid).0;
        let bottom = Self::process_stack_bottom(pid).0;
        &self.bytes[limit..=bottom]
    }

    /// Lay down the context image of a fresh process
    ///
    /// The entry address goes first, low byte first, `address_width` bytes,
    /// exactly as a call would have pushed it. A zeroed status register and
    /// zeroed general purpose registers follow. Restoring from the returned
    /// pointer starts the process at its entry point with a clean register
    /// file.
    pub fn prepare_process_stack(
        &mut self,
        pid: ProcessId,
        entry_address: usize,
        address_width: usize,
    ) -> StackPointer {
        let mut sp = Self::process_stack_bottom(pid);

        for byte in entry_address.to_le_bytes().into_iter().take(address_width) {
            self.push(&mut sp, byte);
        }

        for _ in 0..SAVED_CONTEXT_BYTES {
            self.push(&mut sp, 0);
        }

        sp
    }

    /// Inverse of `prepare_process_stack` for the return address
    pub fn decode_return_address(&self, pid: ProcessId, address_width: usize) -> usize {
        let bottom = Self::process_stack_bottom(pid).0;
        (0..address_width.min(std::mem::size_of::<usize>()))
            .map(|i| (self.bytes[bottom - i] as usize) << (8 * i))
            .fold(0, |acc, part| acc | part)
    }

    /// Bytes from `saved_sp` up to and including the process stack bottom
    ///
    /// The range never leaves the process's own region, so a corrupted
    /// pointer cannot pull other stacks in.
    pub fn used_stack(&self, pid: ProcessId, saved_sp: StackPointer) -> &[u8] {
        let bottom = Self::process_stack_bottom(pid).0;
        let limit = Self::process_stack_limit(pid).0;
        let end = saved_sp.0.clamp(limit, bottom);

        &self.bytes[end..=bottom]
    }

    /// XOR fold from the process stack bottom down to and including `saved_sp`
    pub fn checksum(&self, pid: ProcessId, saved_sp: StackPointer) -> StackChecksum {
        self.used_stack(pid, saved_sp)
            .iter()
            .fold(0, |sum, byte| sum ^ byte)
    }
}

impl Default for StackArena {
    fn default() -> Self {
        Self::new()
    }
}
