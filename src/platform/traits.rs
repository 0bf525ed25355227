/*!
 * Platform Traits
 *
 * The machine-specific capabilities the scheduler core is written against.
 * Everything that knows about registers, calling conventions or interrupt
 * hardware lives behind these traits.
 */

use crate::process::{StackArena, StackPointer};
use crate::program::Program;
use std::time::Duration;

/// Interrupt enable bits the critical section manager and the dispatcher flip
pub trait InterruptControl {
    /// Global interrupt enable flag
    fn global_interrupts_enabled(&self) -> bool;

    fn set_global_interrupts(&mut self, enabled: bool);

    /// Interrupt source of the scheduler timer
    fn scheduler_timer_enabled(&self) -> bool;

    fn set_scheduler_timer(&mut self, enabled: bool);
}

/// Save and restore of the full execution context
///
/// `save_context` pushes the interrupted program counter and the register
/// file onto the stack the CPU currently uses. `restore_context` pops the
/// same layout and returns from the interrupt, which re-enables interrupts.
/// The stack builder relies on this layout:
///
/// ```text
/// bottom -> return address, low byte first (RETURN_ADDRESS_WIDTH bytes)
///           status register and general purpose registers (33 bytes)
/// top    -> saved stack pointer (next free byte)
/// ```
pub trait ContextSwitch {
    /// Bytes a call or interrupt pushes for the return address
    const RETURN_ADDRESS_WIDTH: usize;

    /// Address the CPU jumps to when entering `program`
    fn code_address(program: Program) -> usize;

    fn stack_pointer(&self) -> StackPointer;

    fn set_stack_pointer(&mut self, sp: StackPointer);

    fn save_context(&mut self, stacks: &mut StackArena);

    fn restore_context(&mut self, stacks: &StackArena);
}

/// Sink for unrecoverable consistency violations
pub trait FatalErrorReporter {
    /// Report and halt; execution must not continue as if nothing happened
    fn report_fatal_error(&mut self, message: &str);
}

/// Everything the scheduler core needs from a board
pub trait Platform: InterruptControl + ContextSwitch + FatalErrorReporter {
    /// Block until the next scheduler timer compare match
    fn wait_for_tick(&mut self, period: Duration);

    /// A halted CPU no longer takes interrupts
    fn is_halted(&self) -> bool {
        false
    }
}
