/*!
 * Kernel Configuration
 *
 * Runtime configuration layered over the compile-time limits.
 * Sources: defaults, JSON documents, and SPOS_* environment variables.
 */

use super::errors::ConfigError;
use super::limits::{DEFAULT_PRIORITY, DEFAULT_TICK_PERIOD, MAX_NUMBER_OF_PROCESSES, MIN_TICK_PERIOD};
use super::types::Priority;
use crate::scheduler::SchedulingStrategy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable names
pub const ENV_PROCESS_SLOTS: &str = "SPOS_PROCESS_SLOTS";
pub const ENV_STRATEGY: &str = "SPOS_STRATEGY";
pub const ENV_DEFAULT_PRIORITY: &str = "SPOS_DEFAULT_PRIORITY";
pub const ENV_TICK_MICROS: &str = "SPOS_TICK_MICROS";
pub const ENV_SEED: &str = "SPOS_SEED";

/// Scheduler core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct KernelConfig {
    /// Usable process slots, at most MAX_NUMBER_OF_PROCESSES
    pub process_slots: usize,
    /// Priority of processes launched by autostart
    pub default_priority: Priority,
    /// Strategy active after boot
    pub strategy: SchedulingStrategy,
    /// Scheduler timer period
    pub tick_period_micros: u64,
    /// Seed for the random strategy; entropy when absent
    pub rng_seed: Option<u64>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            process_slots: MAX_NUMBER_OF_PROCESSES,
            default_priority: DEFAULT_PRIORITY,
            strategy: SchedulingStrategy::Even,
            tick_period_micros: DEFAULT_TICK_PERIOD.as_micros() as u64,
            rng_seed: None,
        }
    }
}

impl KernelConfig {
    /// Defaults overridden by any SPOS_* environment variables that are set
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(slots) = env_value::<usize>(ENV_PROCESS_SLOTS)? {
            config.process_slots = slots;
        }
        if let Ok(raw) = std::env::var(ENV_STRATEGY) {
            config.strategy = SchedulingStrategy::from_str(&raw)?;
        }
        if let Some(priority) = env_value::<Priority>(ENV_DEFAULT_PRIORITY)? {
            config.default_priority = priority;
        }
        if let Some(micros) = env_value::<u64>(ENV_TICK_MICROS)? {
            config.tick_period_micros = micros;
        }
        if let Some(seed) = env_value::<u64>(ENV_SEED)? {
            config.rng_seed = Some(seed);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check bounds that the type system cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.process_slots == 0 || self.process_slots > MAX_NUMBER_OF_PROCESSES {
            return Err(ConfigError::ProcessSlots {
                requested: self.process_slots,
                max: MAX_NUMBER_OF_PROCESSES,
            });
        }

        let min_micros = MIN_TICK_PERIOD.as_micros() as u64;
        if self.tick_period_micros < min_micros {
            return Err(ConfigError::TickPeriod {
                micros: self.tick_period_micros,
                min_micros,
            });
        }

        Ok(())
    }

    pub fn with_process_slots(mut self, slots: usize) -> Self {
        self.process_slots = slots;
        self
    }

    pub fn with_strategy(mut self, strategy: SchedulingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    #[inline]
    pub fn tick_period(&self) -> Duration {
        Duration::from_micros(self.tick_period_micros)
    }
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}
