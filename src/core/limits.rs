/*!
 * System Limits and Constants
 *
 * Centralized location for the fixed table sizes and stack geometry.
 * Every table in the kernel is statically sized from these values.
 */

use super::types::{Priority, ProcessId, ProgramId};
use std::time::Duration;

// =============================================================================
// PROCESS TABLE
// =============================================================================

/// Number of process slots (slot 0 is reserved for the idle process)
pub const MAX_NUMBER_OF_PROCESSES: usize = 8;

/// Slot of the idle process, always occupied once the scheduler is initialized
pub const IDLE_PROCESS: ProcessId = 0;

/// Priority given to autostart programs at boot
pub const DEFAULT_PRIORITY: Priority = 128;

// =============================================================================
// PROGRAM REGISTRY
// =============================================================================

/// Number of program slots; one autostart bit per slot
pub const MAX_NUMBER_OF_PROGRAMS: usize = 16;

/// Program slot of the idle program
pub const IDLE_PROGRAM: ProgramId = 0;

// =============================================================================
// STACK GEOMETRY
// =============================================================================

/// Private stack size of each process in bytes
pub const PROCESS_STACK_SIZE: usize = 256;

/// Size of the dedicated scheduler/ISR stack in bytes
pub const ISR_STACK_SIZE: usize = 192;

/// Total stack arena: ISR stack on top, process stacks below it
pub const STACK_ARENA_SIZE: usize = ISR_STACK_SIZE + MAX_NUMBER_OF_PROCESSES * PROCESS_STACK_SIZE;

/// Number of general purpose registers saved on a context switch
pub const GENERAL_PURPOSE_REGISTERS: usize = 32;

/// Status register plus all general purpose registers
pub const SAVED_CONTEXT_BYTES: usize = 1 + GENERAL_PURPOSE_REGISTERS;

// =============================================================================
// CRITICAL SECTIONS
// =============================================================================

/// Deepest supported critical section nesting
pub const MAX_CRITICAL_NESTING: i16 = 255;

// =============================================================================
// TIMING
// =============================================================================

/// Default period of the scheduler timer compare match
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(10);

/// Shortest accepted tick period
pub const MIN_TICK_PERIOD: Duration = Duration::from_micros(100);

/// Delay between two idle heartbeats in milliseconds
pub const DEFAULT_OUTPUT_DELAY_MS: u32 = 100;
