/*!
 * Scheduler Tests
 * Strategy behaviour over long simulated runs
 */

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use spos_kernel::scheduler::SchedulingInfo;
use spos_kernel::{
    Kernel, KernelBuilder, ProcessId, ProcessState, SchedulingStrategy, SimulatedAvr, IDLE_PROCESS,
};

fn worker() {
    std::hint::black_box(0x42u8);
}

/// Started kernel with one process per priority, in slots 1..
fn started(strategy: SchedulingStrategy, priorities: &[u8]) -> Kernel<SimulatedAvr> {
    let mut kernel = KernelBuilder::new(SimulatedAvr::new())
        .with_strategy(strategy)
        .with_seed(0x5EED)
        .with_program(worker)
        .build()
        .unwrap();
    kernel.init_scheduler().unwrap();

    let id = kernel.lookup_program_id(worker).unwrap();
    for &priority in priorities {
        kernel.exec(id, priority).unwrap();
    }
    kernel.launch().unwrap();
    kernel
}

fn turns(kernel: &Kernel<SimulatedAvr>, count: usize) -> Vec<u64> {
    (1..=count as ProcessId).map(|pid| kernel.turns(pid)).collect()
}

#[test]
fn test_even_shares_equally() {
    let mut kernel = started(SchedulingStrategy::Even, &[5, 200, 17]);
    assert_eq!(kernel.run_for(300), Ok(300));

    assert_eq!(turns(&kernel, 3), vec![100, 100, 100]);
    assert_eq!(kernel.turns(IDLE_PROCESS), 0);
}

#[test]
fn test_even_falls_back_to_idle() {
    let mut kernel = started(SchedulingStrategy::Even, &[1, 1]);
    kernel.run_for(4).unwrap();
    kernel.kill(1).unwrap();
    kernel.kill(2).unwrap();

    kernel.run_for(10).unwrap();
    assert_eq!(kernel.get_current_process(), IDLE_PROCESS);
    assert_eq!(kernel.turns(IDLE_PROCESS), 10);
}

#[test]
fn test_round_robin_proportional_to_priority() {
    let mut kernel = started(SchedulingStrategy::RoundRobin, &[1, 2, 3]);
    kernel.run_for(600).unwrap();

    assert_eq!(turns(&kernel, 3), vec![100, 200, 300]);
}

#[test]
fn test_round_robin_reused_slot_gets_its_own_slice() {
    let mut kernel = started(SchedulingStrategy::RoundRobin, &[50, 1]);
    kernel.run_for(2).unwrap();
    assert_eq!(kernel.get_current_process(), 1);

    kernel.kill(1).unwrap();
    let id = kernel.lookup_program_id(worker).unwrap();
    assert_eq!(kernel.exec(id, 1), Ok(1));

    let picks: Vec<ProcessId> = (0..6)
        .map(|_| {
            kernel.tick();
            kernel.get_current_process()
        })
        .collect();
    assert_eq!(picks, vec![2, 1, 2, 1, 2, 1]);
    assert_eq!(kernel.turns(1), 3);
}

#[test]
fn test_run_to_completion_holds_cpu() {
    let mut kernel = started(SchedulingStrategy::RunToCompletion, &[1, 1, 1]);
    kernel.run_for(50).unwrap();

    assert_eq!(kernel.get_current_process(), 1);
    assert_eq!(turns(&kernel, 3), vec![50, 0, 0]);

    kernel.kill(1).unwrap();
    kernel.run_for(5).unwrap();
    assert_eq!(kernel.get_current_process(), 2);
    assert_eq!(kernel.turns(2), 5);
}

#[test]
fn test_random_is_reproducible_and_skips_idle() {
    let picks = |seed: u64| {
        let mut kernel = KernelBuilder::new(SimulatedAvr::new())
            .with_strategy(SchedulingStrategy::Random)
            .with_seed(seed)
            .with_autostart_program(worker)
            .build()
            .unwrap();
        kernel.init_scheduler().unwrap();
        let id = kernel.lookup_program_id(worker).unwrap();
        kernel.exec(id, 1).unwrap();
        kernel.exec(id, 1).unwrap();
        kernel.launch().unwrap();

        (0..900)
            .map(|_| {
                kernel.tick();
                kernel.get_current_process()
            })
            .collect::<Vec<_>>()
    };

    let first = picks(99);
    assert_eq!(first, picks(99));
    assert!(first.iter().all(|&pid| pid != IDLE_PROCESS));

    for pid in 1..=3 {
        let count = first.iter().filter(|&&p| p == pid).count();
        assert!((200..=400).contains(&count), "process {pid} ran {count} times");
    }
}

#[test]
fn test_inactive_aging_favors_priority() {
    let mut kernel = started(SchedulingStrategy::InactiveAging, &[10, 10, 0]);
    kernel.run_for(1000).unwrap();

    let counts = turns(&kernel, 3);
    assert!(counts[0] > counts[2] * 3);
    assert!(counts[1] > counts[2] * 3);
    assert!(counts[2] > 0);
}

#[test]
fn test_strategy_change_resets_bookkeeping() {
    let mut kernel = started(SchedulingStrategy::InactiveAging, &[3, 3, 3]);
    kernel.run_for(7).unwrap();
    assert_ne!(kernel.scheduling_info(), &SchedulingInfo::new());

    kernel.set_scheduling_strategy(SchedulingStrategy::RoundRobin);
    assert_eq!(kernel.get_scheduling_strategy(), SchedulingStrategy::RoundRobin);
    assert_eq!(kernel.scheduling_info(), &SchedulingInfo::new());
    assert_eq!(kernel.stats().strategy, SchedulingStrategy::RoundRobin);

    // Fresh round-robin slice after the switch
    kernel.run_for(3).unwrap();
    assert!(kernel.scheduling_info().time_slice <= 3);
}

fn strategy() -> impl Strategy<Value = SchedulingStrategy> {
    prop::sample::select(SchedulingStrategy::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_exactly_one_running(strategy in strategy(), priorities in prop::collection::vec(any::<u8>(), 0..7), ticks in 1u64..200) {
        let mut kernel = started(strategy, &priorities);

        for _ in 0..ticks {
            kernel.tick();
            let running: Vec<ProcessId> = kernel
                .process_table()
                .iter()
                .filter(|(_, p)| p.state == ProcessState::Running)
                .map(|(pid, _)| pid)
                .collect();
            prop_assert_eq!(running, vec![kernel.get_current_process()]);
            prop_assert!(priorities.is_empty() || kernel.get_current_process() != IDLE_PROCESS);
        }
    }

    #[test]
    fn prop_round_robin_turns_follow_priority(priorities in prop::collection::vec(0u8..20, 1..7), rounds in 1u64..5, extra in 0u64..20) {
        let mut kernel = started(SchedulingStrategy::RoundRobin, &priorities);
        let round: u64 = priorities.iter().map(|&p| p.max(1) as u64).sum();
        let extra = extra % round;
        kernel.run_for(rounds * round + extra).unwrap();

        for (i, &priority) in priorities.iter().enumerate() {
            let slice = priority.max(1) as u64;
            let got = kernel.turns(i as ProcessId + 1);
            prop_assert!(got >= rounds * slice && got <= (rounds + 1) * slice,
                "process {} with priority {} ran {} times", i + 1, priority, got);
        }
    }

    #[test]
    fn prop_inactive_aging_bounds_wait(priorities in prop::collection::vec(any::<u8>(), 1..7)) {
        let mut kernel = started(SchedulingStrategy::InactiveAging, &priorities);
        let n = priorities.len() as u64;
        let bound = (*priorities.iter().max().unwrap_or(&0) as u64 + 1) * n + n;

        let mut last_ran = vec![0u64; priorities.len() + 1];
        let ticks = bound * 3;
        for t in 1..=ticks {
            kernel.tick();
            last_ran[kernel.get_current_process() as usize] = t;
            for pid in 1..=priorities.len() {
                prop_assert!(t - last_ran[pid] <= bound,
                    "process {} waited more than {} dispatches", pid, bound);
            }
        }
    }
}
