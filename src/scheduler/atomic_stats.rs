/*!
 * Lock-Free Dispatch Statistics
 * Atomic counters updated from the timer interrupt, readable from anywhere
 */

use super::types::{SchedulerStats, SchedulingStrategy};
use crate::core::limits::MAX_NUMBER_OF_PROCESSES;
use crate::core::types::ProcessId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic dispatch statistics
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - Relaxed ordering; counters are independent of each other
#[repr(C, align(64))]
pub struct AtomicDispatchStats {
    total_dispatches: AtomicU64,
    context_switches: AtomicU64,
    suppressed_ticks: AtomicU64,
    turns: [AtomicU64; MAX_NUMBER_OF_PROCESSES],
    // Changes only on explicit strategy switches
    strategy: parking_lot::RwLock<SchedulingStrategy>,
}

impl AtomicDispatchStats {
    pub fn new(strategy: SchedulingStrategy) -> Self {
        Self {
            total_dispatches: AtomicU64::new(0),
            context_switches: AtomicU64::new(0),
            suppressed_ticks: AtomicU64::new(0),
            turns: std::array::from_fn(|_| AtomicU64::new(0)),
            strategy: parking_lot::RwLock::new(strategy),
        }
    }

    /// Record one dispatch that handed the CPU from `previous` to `next`
    ///
    /// # Performance
    /// Hot path - called on every timer tick
    #[inline(always)]
    pub fn record_dispatch(&self, previous: ProcessId, next: ProcessId) {
        self.total_dispatches.fetch_add(1, Ordering::Relaxed);
        if previous != next {
            self.context_switches.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(turns) = self.turns.get(next as usize) {
            turns.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Tick that arrived while interrupts or the timer were masked
    #[inline(always)]
    pub fn inc_suppressed(&self) {
        self.suppressed_ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Start a slot's turn counter over, used when the slot is reallocated
    #[inline]
    pub fn reset_turns(&self, pid: ProcessId) {
        if let Some(turns) = self.turns.get(pid as usize) {
            turns.store(0, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn turns(&self, pid: ProcessId) -> u64 {
        self.turns
            .get(pid as usize)
            .map(|t| t.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    #[inline]
    pub fn total_dispatches(&self) -> u64 {
        self.total_dispatches.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_strategy(&self, strategy: SchedulingStrategy) {
        *self.strategy.write() = strategy;
    }

    /// Snapshot covering the first `slots` process slots
    ///
    /// # Note
    /// Counters are read one by one, so a snapshot taken while ticks are
    /// running may be off by one between fields.
    pub fn snapshot(&self, slots: usize) -> SchedulerStats {
        SchedulerStats {
            strategy: *self.strategy.read(),
            total_dispatches: self.total_dispatches.load(Ordering::Relaxed),
            context_switches: self.context_switches.load(Ordering::Relaxed),
            suppressed_ticks: self.suppressed_ticks.load(Ordering::Relaxed),
            turns: self
                .turns
                .iter()
                .take(slots)
                .map(|t| t.load(Ordering::Relaxed))
                .collect(),
        }
    }
}

impl Default for AtomicDispatchStats {
    fn default() -> Self {
        Self::new(SchedulingStrategy::default())
    }
}
