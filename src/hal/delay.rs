/*!
 * Delay Primitives
 * Busy-wait style delays used by programs running atop the scheduler
 */

use std::time::Duration;

/// Millisecond delay provider
#[cfg_attr(test, mockall::automock)]
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

/// Sleeps the host thread
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// Advances a virtual clock instead of waiting
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedDelay {
    elapsed_ms: u64,
}

impl SimulatedDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total virtual time spent in delays
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

impl Delay for SimulatedDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(ms as u64);
    }
}
