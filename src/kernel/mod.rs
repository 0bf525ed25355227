/*!
 * Scheduler Core
 *
 * The single owner of all scheduler state: process table, program registry,
 * stack arena, active strategy and critical section counter. One instance is
 * built at boot and drives the platform it was given. Nothing here is a
 * global; tests create a fresh kernel per case.
 */

pub mod builder;
mod dispatcher;

pub use builder::KernelBuilder;

use crate::core::config::KernelConfig;
use crate::core::errors::{KernelError, ProcessError, SchedulerError};
use crate::core::limits::{IDLE_PROCESS, IDLE_PROGRAM};
use crate::core::types::{KernelResult, Priority, ProcessId, ProgramId, StackChecksum};
use crate::platform::Platform;
use crate::process::{Process, ProcessResult, ProcessState, ProcessTable, StackArena};
use crate::program::{Program, ProgramRegistry, ProgramResult};
use crate::scheduler::{
    AtomicDispatchStats, Scheduler, SchedulerStats, SchedulingInfo, SchedulingStrategy,
};
use crate::sync::{CriticalGuard, CriticalRegion, CriticalSection};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Scheduler core bound to one platform
pub struct Kernel<P: Platform> {
    platform: P,
    stacks: StackArena,
    table: ProcessTable,
    programs: ProgramRegistry,
    scheduler: Scheduler,
    critical: CriticalSection,
    stats: Arc<AtomicDispatchStats>,
    current: ProcessId,
    started: bool,
    config: KernelConfig,
}

impl<P: Platform> Kernel<P> {
    /// Fresh kernel with the idle program registered and every slot unused
    pub fn new(platform: P, config: KernelConfig) -> KernelResult<Self> {
        config.validate()?;

        info!(
            process_slots = config.process_slots,
            strategy = %config.strategy,
            tick_micros = config.tick_period_micros,
            "Kernel created"
        );

        Ok(Self {
            platform,
            stacks: StackArena::new(),
            table: ProcessTable::new(config.process_slots),
            programs: ProgramRegistry::with_idle(),
            scheduler: Scheduler::new(config.strategy, config.rng_seed),
            critical: CriticalSection::new(),
            stats: Arc::new(AtomicDispatchStats::new(config.strategy)),
            current: IDLE_PROCESS,
            started: false,
            config,
        })
    }

    // ========================================================================
    // Program registry
    // ========================================================================

    /// Register an entry point, or find the slot it already has
    pub fn register_program(&mut self, program: Program) -> ProgramResult<ProgramId> {
        self.enter_critical_section();
        let result = self.programs.register(program);
        self.leave_critical_section();

        match &result {
            Ok(id) => info!(program_id = id, "Program registered"),
            Err(e) => warn!(error = %e, "Program registration failed"),
        }
        result
    }

    /// Register an entry point and mark it for launch by `init_scheduler`
    pub fn register_autostart_program(&mut self, program: Program) -> ProgramResult<ProgramId> {
        let id = self.register_program(program)?;
        self.set_autostart(id, true)?;
        Ok(id)
    }

    pub fn set_autostart(&mut self, id: ProgramId, enabled: bool) -> ProgramResult<()> {
        self.programs.set_autostart(id, enabled)
    }

    #[inline]
    pub fn check_autostart(&self, id: ProgramId) -> bool {
        self.programs.check_autostart(id)
    }

    /// Entry point behind a program ID; `None` when unregistered or out of range
    #[inline]
    pub fn get_program_slot(&self, id: ProgramId) -> Option<Program> {
        self.programs.lookup_function(id)
    }

    #[inline]
    pub fn lookup_program_id(&self, program: Program) -> Option<ProgramId> {
        self.programs.lookup_id(program)
    }

    #[inline]
    pub fn get_number_of_registered_programs(&self) -> usize {
        self.programs.registered_count()
    }

    // ========================================================================
    // Process table
    // ========================================================================

    /// Start a new process running `program_id`
    ///
    /// Allocation happens inside a critical section. The program is checked
    /// before a slot is looked for, so an unknown program never consumes one.
    pub fn exec(&mut self, program_id: ProgramId, priority: Priority) -> ProcessResult<ProcessId> {
        self.enter_critical_section();
        let result = self.allocate_process(program_id, priority);
        self.leave_critical_section();

        match &result {
            Ok(pid) => info!(pid, program_id, priority, "Process created"),
            Err(e) => warn!(program_id, error = %e, "exec failed"),
        }
        result
    }

    fn allocate_process(&mut self, program_id: ProgramId, priority: Priority) -> ProcessResult<ProcessId> {
        let program = self
            .programs
            .lookup_function(program_id)
            .ok_or(ProcessError::InvalidProgram(program_id))?;

        let pid = self.table.first_unused().ok_or(ProcessError::TableFull {
            capacity: self.table.capacity(),
        })?;

        let saved_sp = self
            .stacks
            .prepare_process_stack(pid, P::code_address(program), P::RETURN_ADDRESS_WIDTH);

        let slot = self
            .table
            .get_mut(pid)
            .ok_or(ProcessError::InvalidProcess(pid))?;
        *slot = Process {
            state: ProcessState::Ready,
            priority,
            program_id,
            saved_sp,
        };

        self.scheduler.reset_process(pid, self.current);
        self.stats.reset_turns(pid);
        Ok(pid)
    }

    /// Return a process slot to unused
    ///
    /// The idle process cannot be killed. A process killed while running
    /// keeps the CPU until the next dispatch, which then discards its context.
    pub fn kill(&mut self, pid: ProcessId) -> ProcessResult<()> {
        if pid == IDLE_PROCESS {
            return Err(ProcessError::IdleProtected);
        }

        self.enter_critical_section();
        let result = match self.table.get_mut(pid) {
            Some(process) if process.state.is_used() => {
                *process = Process::unused();
                self.scheduler.reset_process(pid, self.current);
                Ok(())
            }
            _ => Err(ProcessError::InvalidProcess(pid)),
        };
        self.leave_critical_section();

        match &result {
            Ok(()) => info!(pid, "Process killed"),
            Err(e) => warn!(pid, error = %e, "kill failed"),
        }
        result
    }

    #[inline]
    pub fn get_process_slot(&self, pid: ProcessId) -> Option<&Process> {
        self.table.get(pid)
    }

    /// The whole table within the configured capacity
    #[inline]
    pub fn process_table(&self) -> &ProcessTable {
        &self.table
    }

    #[inline]
    pub fn get_current_process(&self) -> ProcessId {
        self.current
    }

    #[inline]
    pub fn get_number_of_active_processes(&self) -> usize {
        self.table.active_count()
    }

    // ========================================================================
    // Stack inspection
    // ========================================================================

    /// XOR of the process stack from its bottom down to its saved pointer
    pub fn get_stack_checksum(&self, pid: ProcessId) -> ProcessResult<StackChecksum> {
        let process = self.used_process(pid)?;
        Ok(self.stacks.checksum(pid, process.saved_sp))
    }

    /// Return address at the bottom of a process stack
    pub fn decode_return_address(&self, pid: ProcessId) -> ProcessResult<usize> {
        self.used_process(pid)?;
        Ok(self.stacks.decode_return_address(pid, P::RETURN_ADDRESS_WIDTH))
    }

    /// Bytes the checksum covers, lowest address first
    pub fn stack_bytes(&self, pid: ProcessId) -> ProcessResult<&[u8]> {
        let process = self.used_process(pid)?;
        Ok(self.stacks.used_stack(pid, process.saved_sp))
    }

    fn used_process(&self, pid: ProcessId) -> ProcessResult<&Process> {
        self.table
            .get(pid)
            .filter(|p| p.state.is_used())
            .ok_or(ProcessError::InvalidProcess(pid))
    }

    // ========================================================================
    // Strategy
    // ========================================================================

    #[inline]
    pub fn get_scheduling_strategy(&self) -> SchedulingStrategy {
        self.scheduler.strategy()
    }

    /// Switch strategy; round-robin and aging bookkeeping start over
    pub fn set_scheduling_strategy(&mut self, strategy: SchedulingStrategy) {
        self.enter_critical_section();
        self.scheduler.set_strategy(strategy);
        self.stats.set_strategy(strategy);
        self.leave_critical_section();
    }

    #[inline]
    pub fn scheduling_info(&self) -> &SchedulingInfo {
        self.scheduler.info()
    }

    // ========================================================================
    // Critical sections
    // ========================================================================

    /// Mask the scheduler timer until the matching leave
    pub fn enter_critical_section(&mut self) {
        if let Err(e) = self.critical.enter(&mut self.platform) {
            self.fatal(e.into());
        }
    }

    /// Unmask the scheduler timer once the outermost section is left
    pub fn leave_critical_section(&mut self) {
        if let Err(e) = self.critical.leave(&mut self.platform) {
            self.fatal(e.into());
        }
    }

    /// Scoped critical section that derefs to the kernel
    pub fn critical_section(&mut self) -> CriticalGuard<'_, Self> {
        CriticalGuard::new(self)
    }

    #[inline]
    pub fn critical_depth(&self) -> i16 {
        self.critical.depth()
    }

    /// Hand the error to the platform, which halts
    fn fatal(&mut self, err: KernelError) {
        error!(error = %err, "Fatal kernel error");
        self.platform.report_fatal_error(&err.to_string());
    }

    // ========================================================================
    // Boot
    // ========================================================================

    /// Clear the table and launch the idle process plus every autostart program
    ///
    /// The idle program always lands in process slot 0; other autostart
    /// programs follow in program ID order with the default priority. An
    /// autostart program that cannot be started is skipped with a warning.
    pub fn init_scheduler(&mut self) -> KernelResult<()> {
        if self.started {
            return Err(SchedulerError::AlreadyStarted.into());
        }

        self.table.reset();

        let priority = self.config.default_priority;
        self.exec(IDLE_PROGRAM, priority)?;

        let autostart: Vec<ProgramId> = self
            .programs
            .autostart_programs()
            .filter(|&id| id != IDLE_PROGRAM)
            .collect();
        for id in autostart {
            if let Err(e) = self.exec(id, priority) {
                warn!(program_id = id, error = %e, "Autostart program skipped");
            }
        }

        info!(
            active = self.table.active_count(),
            "Scheduler initialized"
        );
        Ok(())
    }

    /// Hand the CPU to the idle process
    ///
    /// Loads the stack pointer from the idle slot and restores the context
    /// the stack builder laid down there. On the simulated platform this
    /// returns so that the caller can drive the timer.
    pub fn launch(&mut self) -> KernelResult<()> {
        if self.started {
            return Err(SchedulerError::AlreadyStarted.into());
        }

        let idle = self
            .table
            .get_mut(IDLE_PROCESS)
            .filter(|p| p.state.is_used())
            .ok_or(SchedulerError::NotStarted)?;
        idle.state = ProcessState::Running;
        let sp = idle.saved_sp;

        self.current = IDLE_PROCESS;
        self.platform.set_stack_pointer(sp);
        self.platform.restore_context(&self.stacks);
        self.started = true;

        info!(strategy = %self.scheduler.strategy(), "Scheduler started");
        Ok(())
    }

    /// Drive `ticks` timer compare matches; returns how many dispatched
    pub fn run_for(&mut self, ticks: u64) -> KernelResult<u64> {
        if !self.started {
            return Err(SchedulerError::NotStarted.into());
        }

        let period = self.config.tick_period();
        let mut dispatched = 0;
        for _ in 0..ticks {
            self.platform.wait_for_tick(period);
            if self.tick() {
                dispatched += 1;
            }
        }
        Ok(dispatched)
    }

    /// Launch and drive the timer forever
    pub fn start_scheduler(mut self) -> ! {
        if let Err(e) = self.launch() {
            self.fatal(e);
        }

        let period = self.config.tick_period();
        loop {
            self.platform.wait_for_tick(period);
            self.tick();
        }
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    #[inline]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Lets tests play the running process (registers, program counter)
    #[inline]
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Snapshot of dispatch statistics for the configured slots
    pub fn stats(&self) -> SchedulerStats {
        self.stats.snapshot(self.table.capacity())
    }

    /// Shared handle for readers outside the kernel
    pub fn stats_handle(&self) -> Arc<AtomicDispatchStats> {
        Arc::clone(&self.stats)
    }

    /// Dispatches that selected `pid` since it was last created
    #[inline]
    pub fn turns(&self, pid: ProcessId) -> u64 {
        self.stats.turns(pid)
    }
}

impl<P: Platform> CriticalRegion for Kernel<P> {
    fn enter_critical_section(&mut self) {
        Kernel::enter_critical_section(self);
    }

    fn leave_critical_section(&mut self) {
        Kernel::leave_critical_section(self);
    }
}
