/*!
 * Program Module
 * Program registration and the built-in idle program
 */

pub mod idle;
pub mod registry;

pub use idle::{heartbeat, idle_program};
pub use registry::{same_program, Program, ProgramRegistry, ProgramResult};
