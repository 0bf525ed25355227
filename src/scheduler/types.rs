/*!
 * Scheduler Types
 * Strategy selection and per-strategy bookkeeping
 */

use crate::core::errors::ConfigError;
use crate::core::limits::MAX_NUMBER_OF_PROCESSES;
use crate::core::types::ProcessId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Scheduling strategy consulted by the dispatcher on every timer tick
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchedulingStrategy {
    /// Cycle through runnable slots, ignoring priority
    #[default]
    Even,
    /// Uniform draw among runnable slots
    Random,
    /// Priority many consecutive turns, then advance
    RoundRobin,
    /// Waiting processes grow older until they win
    InactiveAging,
    /// Keep the current process until it terminates
    RunToCompletion,
}

impl SchedulingStrategy {
    /// All strategies in declaration order
    pub const ALL: [SchedulingStrategy; 5] = [
        Self::Even,
        Self::Random,
        Self::RoundRobin,
        Self::InactiveAging,
        Self::RunToCompletion,
    ];

    /// Convert to string representation
    ///
    /// # Performance
    /// Hot path - frequently called for logging and serialization
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Even => "even",
            Self::Random => "random",
            Self::RoundRobin => "round_robin",
            Self::InactiveAging => "inactive_aging",
            Self::RunToCompletion => "run_to_completion",
        }
    }
}

impl FromStr for SchedulingStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "even" => Ok(Self::Even),
            "random" | "rand" => Ok(Self::Random),
            "round_robin" | "roundrobin" | "rr" => Ok(Self::RoundRobin),
            "inactive_aging" | "inactiveaging" | "aging" => Ok(Self::InactiveAging),
            "run_to_completion" | "runtocompletion" | "rtc" => Ok(Self::RunToCompletion),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for SchedulingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SchedulingStrategy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SchedulingStrategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// State kept between dispatches by the stateful strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingInfo {
    /// Turns left for the current round-robin holder
    pub time_slice: u8,
    /// Inactive-aging counters, indexed by process slot
    pub age: [u32; MAX_NUMBER_OF_PROCESSES],
}

impl SchedulingInfo {
    pub const fn new() -> Self {
        Self {
            time_slice: 0,
            age: [0; MAX_NUMBER_OF_PROCESSES],
        }
    }

    /// Forget everything, used when the strategy changes
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Forget what is known about one slot, used when it is killed or reallocated
    ///
    /// The round-robin slice belongs to `current`, so it is dropped as well
    /// when that slot is the one being reset.
    pub fn reset_process(&mut self, pid: ProcessId, current: ProcessId) {
        if let Some(age) = self.age.get_mut(pid as usize) {
            *age = 0;
        }
        if pid == current {
            self.time_slice = 0;
        }
    }
}

impl Default for SchedulingInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time dispatch statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub strategy: SchedulingStrategy,
    pub total_dispatches: u64,
    pub context_switches: u64,
    pub suppressed_ticks: u64,
    /// Times each slot was picked, indexed by process ID
    pub turns: Vec<u64>,
}
