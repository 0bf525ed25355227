/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{ProcessId, ProgramId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Program registry errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProgramError {
    #[error("Program registry full ({capacity} slots)")]
    #[diagnostic(
        code(program::registry_full),
        help("Programs are never deregistered. Raise MAX_NUMBER_OF_PROGRAMS or register fewer programs.")
    )]
    RegistryFull { capacity: usize },

    #[error("Program {0} is not registered")]
    #[diagnostic(
        code(program::not_registered),
        help("Register the entry point before referring to its program ID.")
    )]
    NotRegistered(ProgramId),
}

/// Process table errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Cannot execute program {0}: no such program")]
    #[diagnostic(
        code(process::invalid_program),
        help("The program ID does not resolve to a registered entry point.")
    )]
    InvalidProgram(ProgramId),

    #[error("Process table full ({capacity} slots)")]
    #[diagnostic(
        code(process::table_full),
        help("Every process slot is in use. Wait for a process to terminate.")
    )]
    TableFull { capacity: usize },

    #[error("Invalid process {0}")]
    #[diagnostic(
        code(process::invalid_process),
        help("The process ID is out of range or the slot is unused.")
    )]
    InvalidProcess(ProcessId),

    #[error("The idle process cannot be terminated")]
    #[diagnostic(
        code(process::idle_protected),
        help("Slot 0 hosts the idle process for the whole uptime.")
    )]
    IdleProtected,
}

/// Scheduler and critical section errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Left more critical sections than were entered")]
    #[diagnostic(
        code(scheduler::critical_section_underflow),
        help("Every leave_critical_section must pair with an earlier enter_critical_section.")
    )]
    CriticalSectionUnderflow,

    #[error("Critical section nesting exceeded {depth}")]
    #[diagnostic(
        code(scheduler::critical_section_overflow),
        help("Critical sections nest at most 255 levels deep.")
    )]
    CriticalSectionOverflow { depth: i16 },

    #[error("Strategy selected process {0}, which cannot run")]
    #[diagnostic(
        code(scheduler::invalid_selection),
        help("The process table or the strategy state is corrupted.")
    )]
    InvalidSelection(ProcessId),

    #[error("Scheduler already started")]
    #[diagnostic(code(scheduler::already_started))]
    AlreadyStarted,

    #[error("Scheduler not started")]
    #[diagnostic(
        code(scheduler::not_started),
        help("Call init_scheduler and launch before driving the timer.")
    )]
    NotStarted,
}

/// Configuration errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Invalid process slot count {requested}: must be between 1 and {max}")]
    #[diagnostic(code(config::process_slots))]
    ProcessSlots { requested: usize, max: usize },

    #[error("Invalid scheduling strategy '{0}'")]
    #[diagnostic(
        code(config::strategy),
        help("Valid: even, random, round_robin, inactive_aging, run_to_completion")
    )]
    UnknownStrategy(String),

    #[error("Tick period of {micros}us is below the minimum of {min_micros}us")]
    #[diagnostic(code(config::tick_period))]
    TickPeriod { micros: u64, min_micros: u64 },

    #[error("Invalid value '{value}' for {key}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue { key: String, value: String },

    #[error("Malformed configuration: {0}")]
    #[diagnostic(code(config::malformed))]
    Malformed(String),
}

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, PartialEq, Diagnostic)]
pub enum KernelError {
    #[error("Program error: {0}")]
    #[diagnostic(transparent)]
    Program(#[from] ProgramError),

    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Scheduler error: {0}")]
    #[diagnostic(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}
