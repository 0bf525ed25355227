/*!
 * Process Tests
 * Program registration, exec, kill and stack layout through the kernel API
 */

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use spos_kernel::platform::ContextSwitch;
use spos_kernel::process::stack::StackArena;
use spos_kernel::{
    Kernel, KernelBuilder, ProcessError, ProcessState, ProgramError, SimulatedAvr, IDLE_PROCESS,
    SAVED_CONTEXT_BYTES,
};

fn program_a() {
    std::hint::black_box(0xAAu8);
}

fn program_b() {
    std::hint::black_box(0xBBu8);
}

fn kernel(slots: usize) -> Kernel<SimulatedAvr> {
    let mut kernel = KernelBuilder::new(SimulatedAvr::new())
        .with_process_slots(slots)
        .with_program(program_a)
        .with_program(program_b)
        .build()
        .unwrap();
    kernel.init_scheduler().unwrap();
    kernel
}

#[test]
fn test_exec_until_table_full() {
    let mut kernel = kernel(4);
    let a = kernel.lookup_program_id(program_a).unwrap();

    assert_eq!(kernel.exec(a, 100), Ok(1));
    assert_eq!(kernel.get_process_slot(1).unwrap().state, ProcessState::Ready);
    assert_eq!(kernel.get_process_slot(1).unwrap().priority, 100);
    assert_eq!(kernel.get_process_slot(1).unwrap().program_id, a);

    assert_eq!(kernel.exec(a, 100), Ok(2));
    assert_eq!(kernel.exec(a, 100), Ok(3));
    assert_eq!(kernel.exec(a, 100), Err(ProcessError::TableFull { capacity: 4 }));
    assert_eq!(kernel.get_number_of_active_processes(), 4);
}

#[test]
fn test_exec_unknown_program_allocates_nothing() {
    let mut kernel = kernel(4);

    assert_eq!(kernel.exec(15, 1), Err(ProcessError::InvalidProgram(15)));
    assert_eq!(kernel.exec(200, 1), Err(ProcessError::InvalidProgram(200)));
    assert_eq!(kernel.get_number_of_active_processes(), 1);
    assert_eq!(kernel.critical_depth(), 0);
}

#[test]
fn test_idle_occupies_slot_zero() {
    let kernel = kernel(4);
    let idle = kernel.get_process_slot(IDLE_PROCESS).unwrap();

    assert_eq!(idle.state, ProcessState::Ready);
    assert_eq!(idle.program_id, 0);
    assert_eq!(
        kernel.decode_return_address(IDLE_PROCESS),
        Ok(SimulatedAvr::code_address(spos_kernel::idle_program))
    );
}

#[test]
fn test_autostart_programs_launch_in_id_order() {
    let mut kernel = KernelBuilder::new(SimulatedAvr::new())
        .with_default_priority(7)
        .with_autostart_program(program_b)
        .with_program(program_a)
        .build()
        .unwrap();
    kernel.init_scheduler().unwrap();

    assert_eq!(kernel.get_number_of_active_processes(), 2);
    let process = kernel.get_process_slot(1).unwrap();
    assert_eq!(process.program_id, kernel.lookup_program_id(program_b).unwrap());
    assert_eq!(process.priority, 7);
}

#[test]
fn test_stack_decodes_to_entry_point() {
    let mut kernel = kernel(4);
    let b = kernel.lookup_program_id(program_b).unwrap();
    let pid = kernel.exec(b, 3).unwrap();

    assert_eq!(
        kernel.decode_return_address(pid),
        Ok(SimulatedAvr::code_address(program_b))
    );

    let saved_sp = kernel.get_process_slot(pid).unwrap().saved_sp;
    assert_eq!(
        saved_sp.as_index(),
        StackArena::process_stack_bottom(pid).as_index()
            - SimulatedAvr::RETURN_ADDRESS_WIDTH
            - SAVED_CONTEXT_BYTES
    );

    // Everything below the return address is a zeroed register image
    let bytes = kernel.stack_bytes(pid).unwrap();
    assert_eq!(bytes.len(), SimulatedAvr::RETURN_ADDRESS_WIDTH + SAVED_CONTEXT_BYTES + 1);
    assert!(bytes[..=SAVED_CONTEXT_BYTES].iter().all(|&b| b == 0));
}

#[test]
fn test_register_program_twice() {
    let mut kernel = kernel(2);
    let before = kernel.get_number_of_registered_programs();

    let first = kernel.register_program(program_a).unwrap();
    let second = kernel.register_program(program_a).unwrap();

    assert_eq!(first, second);
    assert_eq!(kernel.get_number_of_registered_programs(), before);
}

#[test]
fn test_lookups_out_of_range() {
    let kernel = kernel(2);

    assert!(kernel.get_program_slot(200).is_none());
    assert!(kernel.get_program_slot(15).is_none());
    assert!(kernel.get_process_slot(2).is_none());
    assert!(!kernel.check_autostart(200));
    assert_eq!(kernel.get_stack_checksum(5), Err(ProcessError::InvalidProcess(5)));
}

#[test]
fn test_set_autostart_requires_registration() {
    let mut kernel = kernel(2);
    assert_eq!(kernel.set_autostart(9, true), Err(ProgramError::NotRegistered(9)));
}

#[test]
fn test_kill_frees_slot() {
    let mut kernel = kernel(3);
    let a = kernel.lookup_program_id(program_a).unwrap();
    let b = kernel.lookup_program_id(program_b).unwrap();

    assert_eq!(kernel.exec(a, 1), Ok(1));
    assert_eq!(kernel.exec(a, 1), Ok(2));
    kernel.kill(1).unwrap();

    assert_eq!(kernel.get_process_slot(1).unwrap().state, ProcessState::Unused);
    assert_eq!(kernel.exec(b, 9), Ok(1));
    assert_eq!(
        kernel.decode_return_address(1),
        Ok(SimulatedAvr::code_address(program_b))
    );
    assert_eq!(kernel.kill(IDLE_PROCESS), Err(ProcessError::IdleProtected));
}

#[test]
fn test_checksum_is_deterministic() {
    let mut a = kernel(4);
    let mut b = kernel(4);
    let id = a.lookup_program_id(program_a).unwrap();
    a.exec(id, 1).unwrap();
    b.exec(id, 1).unwrap();

    assert_eq!(a.get_stack_checksum(1), b.get_stack_checksum(1));
    let folded = a.stack_bytes(1).unwrap().iter().fold(0, |acc, byte| acc ^ byte);
    assert_eq!(a.get_stack_checksum(1), Ok(folded));
}

#[derive(Debug, Clone)]
enum Op {
    Exec { use_b: bool, priority: u8 },
    Kill(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<bool>(), any::<u8>()).prop_map(|(use_b, priority)| Op::Exec { use_b, priority }),
        (0u8..8).prop_map(Op::Kill),
    ]
}

proptest! {
    #[test]
    fn prop_exec_only_fills_unused_slots(slots in 1usize..=8, ops in prop::collection::vec(op(), 0..40)) {
        let mut kernel = kernel(slots);
        let a = kernel.lookup_program_id(program_a).unwrap();
        let b = kernel.lookup_program_id(program_b).unwrap();

        for op in ops {
            match op {
                Op::Exec { use_b, priority } => {
                    let before: Vec<ProcessState> = kernel
                        .process_table()
                        .iter()
                        .map(|(_, p)| p.state)
                        .collect();
                    let program = if use_b { b } else { a };

                    match kernel.exec(program, priority) {
                        Ok(pid) => {
                            prop_assert_eq!(before[pid as usize], ProcessState::Unused);
                            prop_assert_eq!(kernel.get_process_slot(pid).unwrap().state, ProcessState::Ready);
                        }
                        Err(e) => {
                            prop_assert_eq!(e, ProcessError::TableFull { capacity: slots });
                            prop_assert!(before.iter().all(|s| *s != ProcessState::Unused));
                        }
                    }
                }
                Op::Kill(pid) => {
                    let _ = kernel.kill(pid);
                }
            }

            let used = kernel
                .process_table()
                .iter()
                .filter(|(_, p)| p.state != ProcessState::Unused)
                .count();
            prop_assert_eq!(kernel.get_number_of_active_processes(), used);
            prop_assert_eq!(kernel.critical_depth(), 0);
        }
    }

    #[test]
    fn prop_checksum_detects_single_byte_change(offset in 0usize..40, flip in 1u8..=255) {
        let mut arena = StackArena::new();
        let sp = arena.prepare_process_stack(3, 0x1234_5678, SimulatedAvr::RETURN_ADDRESS_WIDTH);
        let before = arena.checksum(3, sp);

        let used = arena.used_stack(3, sp).len();
        let target = spos_kernel::StackPointer::new(sp.as_index() + offset % used);
        arena.write(target, arena.read(target) ^ flip);

        prop_assert_ne!(arena.checksum(3, sp), before);
    }
}
