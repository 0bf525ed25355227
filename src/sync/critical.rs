/*!
 * Critical Sections
 *
 * Nestable regions in which the scheduler timer interrupt is masked. Each
 * counter update runs with global interrupts off and puts the global flag
 * back the way it was found, so a tick can never observe a half-updated
 * nesting depth.
 */

use crate::core::errors::SchedulerError;
use crate::core::limits::MAX_CRITICAL_NESTING;
use crate::platform::InterruptControl;
use std::ops::{Deref, DerefMut};

/// Nesting counter for critical sections
///
/// The depth is signed so that an unbalanced leave is detected before any
/// state changes instead of wrapping around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CriticalSection {
    depth: i16,
}

impl CriticalSection {
    pub const fn new() -> Self {
        Self { depth: 0 }
    }

    #[inline(always)]
    pub fn depth(&self) -> i16 {
        self.depth
    }

    /// Open one more nesting level and mask the scheduler timer
    ///
    /// Returns the new depth. Fails without touching the counter once
    /// MAX_CRITICAL_NESTING levels are open.
    pub fn enter<I: InterruptControl + ?Sized>(
        &mut self,
        cpu: &mut I,
    ) -> Result<i16, SchedulerError> {
        let global = cpu.global_interrupts_enabled();
        cpu.set_global_interrupts(false);

        let result = if self.depth >= MAX_CRITICAL_NESTING {
            Err(SchedulerError::CriticalSectionOverflow { depth: self.depth })
        } else {
            self.depth += 1;
            cpu.set_scheduler_timer(false);
            Ok(self.depth)
        };

        cpu.set_global_interrupts(global);
        result
    }

    /// Close one nesting level; the outermost leave unmasks the timer
    ///
    /// Leaving at depth zero is reported and the counter stays at zero.
    pub fn leave<I: InterruptControl + ?Sized>(
        &mut self,
        cpu: &mut I,
    ) -> Result<i16, SchedulerError> {
        let global = cpu.global_interrupts_enabled();
        cpu.set_global_interrupts(false);

        let result = if self.depth <= 0 {
            Err(SchedulerError::CriticalSectionUnderflow)
        } else {
            self.depth -= 1;
            if self.depth == 0 {
                cpu.set_scheduler_timer(true);
            }
            Ok(self.depth)
        };

        cpu.set_global_interrupts(global);
        result
    }
}

/// Anything that can open and close critical sections on its own
pub trait CriticalRegion {
    fn enter_critical_section(&mut self);
    fn leave_critical_section(&mut self);
}

/// Scoped critical section; leaves on drop
///
/// ```ignore
/// {
///     let mut kernel = kernel.critical_section();
///     kernel.set_scheduling_strategy(SchedulingStrategy::RoundRobin);
/// } // timer unmasked again here
/// ```
pub struct CriticalGuard<'a, T: CriticalRegion> {
    owner: &'a mut T,
}

impl<'a, T: CriticalRegion> CriticalGuard<'a, T> {
    pub fn new(owner: &'a mut T) -> Self {
        owner.enter_critical_section();
        Self { owner }
    }
}

impl<T: CriticalRegion> Deref for CriticalGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.owner
    }
}

impl<T: CriticalRegion> DerefMut for CriticalGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.owner
    }
}

impl<T: CriticalRegion> Drop for CriticalGuard<'_, T> {
    fn drop(&mut self) {
        self.owner.leave_critical_section();
    }
}
