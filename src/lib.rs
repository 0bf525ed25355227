/*!
 * SPOS Kernel Library
 * Preemptive process scheduler core for a single-core microcontroller
 */

pub mod core;
pub mod hal;
pub mod kernel;
pub mod monitoring;
pub mod platform;
pub mod process;
pub mod program;
pub mod scheduler;
pub mod sync;

// Re-exports
pub use crate::core::errors::*;
pub use crate::core::limits::*;
pub use crate::core::types::*;
pub use crate::core::KernelConfig;
pub use hal::{decode_buttons, Buttons, InputDriver};
pub use kernel::{Kernel, KernelBuilder};
pub use monitoring::{init_tracing, span_operation};
pub use platform::{Platform, SimulatedAvr};
pub use process::{Process, ProcessState, StackArena, StackPointer};
pub use program::{idle_program, Program};
pub use scheduler::{SchedulerStats, SchedulingStrategy};
pub use sync::CriticalGuard;
