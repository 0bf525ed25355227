/*!
 * Simulated Microcontroller
 *
 * Register-level model of an 8-bit AVR core with Timer2 as scheduler clock:
 * 32 general purpose registers, SREG with the global interrupt flag in bit 7,
 * TIMSK2 with the compare match A enable in bit 1. Context frames are pushed
 * into the kernel's stack arena with the same byte order the hardware and
 * the save/restore routines use.
 */

use super::traits::{ContextSwitch, FatalErrorReporter, InterruptControl, Platform};
use crate::core::limits::GENERAL_PURPOSE_REGISTERS;
use crate::process::{StackArena, StackPointer};
use crate::program::Program;
use std::time::Duration;
use tracing::error;

/// Global interrupt enable bit in SREG
pub const SREG_I: u8 = 1 << 7;

/// Compare match A interrupt enable bit in TIMSK2
pub const OCIE2A: u8 = 1 << 1;

/// Simulated CPU state
#[derive(Debug, Clone)]
pub struct SimulatedAvr {
    registers: [u8; GENERAL_PURPOSE_REGISTERS],
    sreg: u8,
    timsk2: u8,
    pc: usize,
    sp: StackPointer,
    halted: bool,
    real_time: bool,
    ticks_waited: u64,
    fatal_errors: Vec<String>,
}

impl SimulatedAvr {
    /// CPU right after reset with Timer2 configured: interrupts globally
    /// off, compare match interrupt armed, stack on the ISR region
    pub fn new() -> Self {
        Self {
            registers: [0; GENERAL_PURPOSE_REGISTERS],
            sreg: 0,
            timsk2: OCIE2A,
            pc: 0,
            sp: StackArena::isr_stack_bottom(),
            halted: false,
            real_time: false,
            ticks_waited: 0,
            fatal_errors: Vec::new(),
        }
    }

    /// Sleep for the tick period in `wait_for_tick` instead of returning at once
    pub fn with_real_time(mut self, real_time: bool) -> Self {
        self.real_time = real_time;
        self
    }

    #[inline]
    pub fn registers(&self) -> &[u8; GENERAL_PURPOSE_REGISTERS] {
        &self.registers
    }

    /// Let the running process leave a value in a register
    ///
    /// # Panics
    /// If `index` is not below 32
    #[inline]
    pub fn set_register(&mut self, index: usize, value: u8) {
        self.registers[index] = value;
    }

    #[inline]
    pub fn sreg(&self) -> u8 {
        self.sreg
    }

    /// Set status flags other than the interrupt flag
    #[inline]
    pub fn set_status_flags(&mut self, flags: u8) {
        self.sreg = (self.sreg & SREG_I) | (flags & !SREG_I);
    }

    #[inline]
    pub fn timsk2(&self) -> u8 {
        self.timsk2
    }

    #[inline]
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Let the running process advance its program counter
    #[inline]
    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    #[inline]
    pub fn ticks_waited(&self) -> u64 {
        self.ticks_waited
    }

    /// Every fatal error reported so far, oldest first
    pub fn fatal_errors(&self) -> &[String] {
        &self.fatal_errors
    }
}

impl Default for SimulatedAvr {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptControl for SimulatedAvr {
    #[inline]
    fn global_interrupts_enabled(&self) -> bool {
        self.sreg & SREG_I != 0
    }

    #[inline]
    fn set_global_interrupts(&mut self, enabled: bool) {
        if enabled {
            self.sreg |= SREG_I;
        } else {
            self.sreg &= !SREG_I;
        }
    }

    #[inline]
    fn scheduler_timer_enabled(&self) -> bool {
        self.timsk2 & OCIE2A != 0
    }

    #[inline]
    fn set_scheduler_timer(&mut self, enabled: bool) {
        if enabled {
            self.timsk2 |= OCIE2A;
        } else {
            self.timsk2 &= !OCIE2A;
        }
    }
}

impl ContextSwitch for SimulatedAvr {
    // Host code addresses are full pointers
    const RETURN_ADDRESS_WIDTH: usize = std::mem::size_of::<usize>();

    #[inline]
    fn code_address(program: Program) -> usize {
        program as usize
    }

    #[inline]
    fn stack_pointer(&self) -> StackPointer {
        self.sp
    }

    #[inline]
    fn set_stack_pointer(&mut self, sp: StackPointer) {
        self.sp = sp;
    }

    /// Interrupt entry pushes the program counter low byte first, then the
    /// save routine pushes r31, SREG, r30 down to r0
    fn save_context(&mut self, stacks: &mut StackArena) {
        let mut sp = self.sp;

        for byte in self.pc.to_le_bytes().into_iter().take(Self::RETURN_ADDRESS_WIDTH) {
            stacks.push(&mut sp, byte);
        }

        stacks.push(&mut sp, self.registers[31]);
        stacks.push(&mut sp, self.sreg);
        for reg in (0..31).rev() {
            stacks.push(&mut sp, self.registers[reg]);
        }

        self.sp = sp;
    }

    /// Pops r0 up to r30, SREG, r31, then returns from the interrupt
    fn restore_context(&mut self, stacks: &StackArena) {
        let mut sp = self.sp;

        for reg in 0..31 {
            self.registers[reg] = stacks.pop(&mut sp);
        }
        self.sreg = stacks.pop(&mut sp);
        self.registers[31] = stacks.pop(&mut sp);

        let mut pc = [0u8; std::mem::size_of::<usize>()];
        for byte in (0..Self::RETURN_ADDRESS_WIDTH).rev() {
            pc[byte] = stacks.pop(&mut sp);
        }
        self.pc = usize::from_le_bytes(pc);

        // reti
        self.sreg |= SREG_I;
        self.sp = sp;
    }
}

impl FatalErrorReporter for SimulatedAvr {
    fn report_fatal_error(&mut self, message: &str) {
        error!(message, "Fatal error, halting CPU");
        self.fatal_errors.push(message.to_string());
        self.sreg &= !SREG_I;
        self.halted = true;
    }
}

impl Platform for SimulatedAvr {
    fn wait_for_tick(&mut self, period: Duration) {
        if self.real_time {
            std::thread::sleep(period);
        }
        self.ticks_waited += 1;
    }

    #[inline]
    fn is_halted(&self) -> bool {
        self.halted
    }
}
