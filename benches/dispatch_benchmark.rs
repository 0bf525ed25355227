/*!
 * Dispatch Benchmarks
 *
 * Cost of one timer tick per strategy, and of exec and critical sections
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spos_kernel::{Kernel, KernelBuilder, SchedulingStrategy, SimulatedAvr};

fn worker() {
    black_box(0u8);
}

fn started(strategy: SchedulingStrategy) -> Kernel<SimulatedAvr> {
    let mut kernel = KernelBuilder::new(SimulatedAvr::new())
        .with_strategy(strategy)
        .with_seed(1)
        .with_program(worker)
        .build()
        .unwrap();
    kernel.init_scheduler().unwrap();

    let id = kernel.lookup_program_id(worker).unwrap();
    for priority in [1, 4, 16, 64, 128, 255, 0] {
        kernel.exec(id, priority).unwrap();
    }
    kernel.launch().unwrap();
    kernel
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for strategy in SchedulingStrategy::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(strategy),
            &strategy,
            |b, &strategy| {
                let mut kernel = started(strategy);
                b.iter(|| black_box(kernel.tick()));
            },
        );
    }

    group.finish();
}

fn bench_exec_kill(c: &mut Criterion) {
    let mut kernel = started(SchedulingStrategy::Even);
    kernel.kill(7).unwrap();
    let id = kernel.lookup_program_id(worker).unwrap();

    c.bench_function("exec_kill", |b| {
        b.iter(|| {
            let pid = kernel.exec(black_box(id), 10).unwrap();
            kernel.kill(pid).unwrap();
        });
    });
}

fn bench_critical_section(c: &mut Criterion) {
    let mut kernel = started(SchedulingStrategy::Even);

    c.bench_function("critical_section", |b| {
        b.iter(|| {
            kernel.enter_critical_section();
            kernel.leave_critical_section();
        });
    });
}

fn bench_stack_checksum(c: &mut Criterion) {
    let mut kernel = started(SchedulingStrategy::Even);
    kernel.run_for(16).unwrap();

    c.bench_function("stack_checksum", |b| {
        b.iter(|| black_box(kernel.get_stack_checksum(black_box(3))));
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_exec_kill,
    bench_critical_section,
    bench_stack_checksum
);

criterion_main!(benches);
