/*!
 * Synchronization
 * Critical sections against the scheduler timer
 */

pub mod critical;

pub use critical::{CriticalGuard, CriticalRegion, CriticalSection};
