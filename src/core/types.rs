/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process slot index (0 is always the idle process)
pub type ProcessId = u8;

/// Program registry index
pub type ProgramId = u8;

/// Priority level (0-255, higher is more favorable)
pub type Priority = u8;

/// XOR fold over a process stack
pub type StackChecksum = u8;

/// Common result type for kernel operations
pub type KernelResult<T> = Result<T, super::errors::KernelError>;
