/*!
 * Scheduler Module
 *
 * Strategy selector consulted by the dispatcher on every tick. Each policy
 * lives in its own file as a plain function over the process table; the
 * selector owns the state the stateful policies carry between dispatches.
 */

pub mod aging;
pub mod atomic_stats;
pub mod even;
pub mod random;
pub mod round_robin;
pub mod run_to_completion;
pub mod types;

pub use atomic_stats::AtomicDispatchStats;
pub use types::{SchedulerStats, SchedulingInfo, SchedulingStrategy};

use crate::core::types::ProcessId;
use crate::process::ProcessTable;
use log::{info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Active strategy plus its bookkeeping
pub struct Scheduler {
    strategy: SchedulingStrategy,
    info: SchedulingInfo,
    rng: StdRng,
}

impl Scheduler {
    /// Create a selector; a seed makes the Random policy reproducible
    pub fn new(strategy: SchedulingStrategy, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            strategy,
            info: SchedulingInfo::new(),
            rng,
        }
    }

    #[inline(always)]
    pub fn strategy(&self) -> SchedulingStrategy {
        self.strategy
    }

    #[inline]
    pub fn info(&self) -> &SchedulingInfo {
        &self.info
    }

    /// Switch policy; all bookkeeping starts over, even for the same policy
    pub fn set_strategy(&mut self, strategy: SchedulingStrategy) {
        info!(
            "Changing scheduling strategy from {} to {}",
            self.strategy, strategy
        );
        self.strategy = strategy;
        self.info.reset();
    }

    /// Forget the bookkeeping of one slot; `current` loses its slice if it is that slot
    pub fn reset_process(&mut self, pid: ProcessId, current: ProcessId) {
        self.info.reset_process(pid, current);
    }

    /// Pick the process that runs after `current`
    pub fn select(&mut self, table: &ProcessTable, current: ProcessId) -> ProcessId {
        let next = match self.strategy {
            SchedulingStrategy::Even => even::select(table, current),
            SchedulingStrategy::Random => random::select(table, &mut self.rng),
            SchedulingStrategy::RoundRobin => round_robin::select(table, current, &mut self.info),
            SchedulingStrategy::InactiveAging => aging::select(table, current, &mut self.info),
            SchedulingStrategy::RunToCompletion => run_to_completion::select(table, current),
        };
        trace!("{} selected process {} after {}", self.strategy, next, current);
        next
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulingStrategy::default(), None)
    }
}
