/*!
 * SPOS Kernel - Simulation Entry Point
 *
 * Boots the scheduler core on the simulated microcontroller:
 * - Configuration from SPOS_* environment variables
 * - Demo programs with autostart
 * - Bounded run (first argument, default 1000 ticks) or `forever`
 */

use miette::{IntoDiagnostic, Result};
use spos_kernel::{
    init_tracing, span_operation, KernelBuilder, KernelConfig, SimulatedAvr, IDLE_PROCESS,
};
use tracing::info;

const DEFAULT_TICKS: u64 = 1000;

fn blinker() {
    std::hint::black_box(0xB1u8);
}

fn sensor() {
    std::hint::black_box(0x5Eu8);
}

fn logger() {
    std::hint::black_box(0x10u8);
}

fn main() -> Result<()> {
    init_tracing();

    let config = KernelConfig::from_env()?;
    let forever = std::env::args().nth(1).is_some_and(|arg| arg == "forever");
    let ticks = match std::env::args().nth(1) {
        Some(arg) if arg != "forever" => arg.parse::<u64>().into_diagnostic()?,
        _ => DEFAULT_TICKS,
    };

    info!("SPOS kernel starting...");
    info!("================================================");

    let boot = span_operation("boot");
    let mut kernel = KernelBuilder::new(SimulatedAvr::new().with_real_time(forever))
        .with_config(config)
        .with_autostart_program(blinker)
        .with_autostart_program(sensor)
        .with_program(logger)
        .build()?;

    kernel.init_scheduler()?;
    if let Some(logger_id) = kernel.lookup_program_id(logger) {
        kernel.exec(logger_id, 10)?;
    }
    boot.finish();

    info!(
        active = kernel.get_number_of_active_processes(),
        programs = kernel.get_number_of_registered_programs(),
        strategy = %kernel.get_scheduling_strategy(),
        "Boot complete"
    );

    if forever {
        info!("Handing control to the scheduler");
        kernel.start_scheduler();
    }

    kernel.launch()?;
    let run = span_operation("run");
    let dispatched = kernel.run_for(ticks)?;
    run.finish();

    for (pid, process) in kernel.process_table().iter() {
        if process.state.is_used() {
            info!(
                pid,
                program_id = process.program_id,
                priority = process.priority,
                idle = pid == IDLE_PROCESS,
                turns = kernel.turns(pid),
                checksum = kernel.get_stack_checksum(pid)?,
                "Process summary"
            );
        }
    }

    let stats = serde_json::to_string_pretty(&kernel.stats()).into_diagnostic()?;
    info!(dispatched, "Run complete");
    println!("{stats}");

    Ok(())
}
