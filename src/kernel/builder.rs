/*!
 * Kernel Builder
 * Builder pattern for Kernel construction
 */

use super::Kernel;
use crate::core::config::KernelConfig;
use crate::core::types::{KernelResult, Priority};
use crate::platform::Platform;
use crate::program::Program;
use crate::scheduler::SchedulingStrategy;
use log::info;

/// Builder for Kernel
pub struct KernelBuilder<P: Platform> {
    platform: P,
    config: KernelConfig,
    programs: Vec<(Program, bool)>,
}

impl<P: Platform> KernelBuilder<P> {
    /// Start from the default configuration
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            config: KernelConfig::default(),
            programs: Vec::new(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: KernelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_strategy(mut self, strategy: SchedulingStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn with_process_slots(mut self, slots: usize) -> Self {
        self.config.process_slots = slots;
        self
    }

    /// Seed for the Random strategy
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.rng_seed = Some(seed);
        self
    }

    /// Priority given to autostart processes
    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.config.default_priority = priority;
        self
    }

    /// Register a program without launching it at boot
    pub fn with_program(mut self, program: Program) -> Self {
        self.programs.push((program, false));
        self
    }

    /// Register a program that `init_scheduler` launches
    pub fn with_autostart_program(mut self, program: Program) -> Self {
        self.programs.push((program, true));
        self
    }

    /// Validate the configuration and register the programs in order
    pub fn build(self) -> KernelResult<Kernel<P>> {
        let mut kernel = Kernel::new(self.platform, self.config)?;

        for (program, autostart) in self.programs {
            if autostart {
                kernel.register_autostart_program(program)?;
            } else {
                kernel.register_program(program)?;
            }
        }

        info!(
            "Kernel built with {} programs ({} slots, {} strategy)",
            kernel.get_number_of_registered_programs(),
            kernel.config().process_slots,
            kernel.get_scheduling_strategy()
        );

        Ok(kernel)
    }
}
