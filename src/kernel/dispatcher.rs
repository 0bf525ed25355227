/*!
 * Dispatcher
 *
 * Timer compare match handler. Saves the running process, lets the active
 * strategy pick a successor on the ISR stack and resumes that successor.
 * Runs with global interrupts cleared from entry until the final
 * return-from-interrupt in `restore_context`.
 */

use super::Kernel;
use crate::core::errors::SchedulerError;
use crate::core::limits::IDLE_PROCESS;
use crate::platform::Platform;
use crate::process::{ProcessState, StackArena};
use tracing::trace;

impl<P: Platform> Kernel<P> {
    /// One timer compare match
    ///
    /// The interrupt is only taken when global interrupts and the timer
    /// source are both enabled, which never holds inside a critical section.
    /// Returns whether a dispatch happened.
    pub fn tick(&mut self) -> bool {
        let taken = self.started
            && !self.platform.is_halted()
            && self.platform.global_interrupts_enabled()
            && self.platform.scheduler_timer_enabled();

        if !taken {
            self.stats.inc_suppressed();
            return false;
        }

        // Interrupt entry
        self.platform.set_global_interrupts(false);
        self.dispatch();
        true
    }

    fn dispatch(&mut self) {
        let previous = self.current;
        let outgoing_alive = self.table.state(previous) == ProcessState::Running;

        // A process killed while running may share its stack region with a
        // freshly created one; its frame goes to the ISR stack and is dropped.
        if !outgoing_alive {
            self.platform
                .set_stack_pointer(StackArena::isr_stack_bottom());
        }

        self.platform.save_context(&mut self.stacks);

        if outgoing_alive {
            if let Some(process) = self.table.get_mut(previous) {
                process.saved_sp = self.platform.stack_pointer();
                process.state = ProcessState::Ready;
            }
        }

        self.platform
            .set_stack_pointer(StackArena::isr_stack_bottom());

        let next = self.scheduler.select(&self.table, previous);

        let Some(process) = self.table.get_mut(next).filter(|p| p.is_runnable()) else {
            self.fatal(SchedulerError::InvalidSelection(next).into());
            return;
        };
        process.state = ProcessState::Running;
        let sp = process.saved_sp;

        self.current = next;
        self.platform.set_stack_pointer(sp);
        self.platform.restore_context(&self.stacks);

        self.stats.record_dispatch(previous, next);
        trace!(from = previous, to = next, idle = next == IDLE_PROCESS, "Dispatched");
    }
}
