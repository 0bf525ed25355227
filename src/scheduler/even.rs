/*!
 * Even Strategy
 * Cyclic scan over the process slots; every runnable process gets one turn per round
 */

use crate::core::limits::IDLE_PROCESS;
use crate::core::types::ProcessId;
use crate::process::ProcessTable;

/// Next runnable non-idle slot after `current`, wrapping around
///
/// The current slot is the last candidate, so a lone runnable process keeps
/// the CPU. Falls back to the idle process when nothing else is runnable.
pub fn select(table: &ProcessTable, current: ProcessId) -> ProcessId {
    let capacity = table.capacity();

    (1..=capacity)
        .map(|step| ((current as usize + step) % capacity) as ProcessId)
        .find(|&pid| pid != IDLE_PROCESS && table.is_runnable(pid))
        .unwrap_or(IDLE_PROCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessState;

    fn table(states: &[ProcessState]) -> ProcessTable {
        let mut table = ProcessTable::new(states.len());
        for (pid, state) in states.iter().enumerate() {
            table.get_mut(pid as ProcessId).unwrap().state = *state;
        }
        table
    }

    #[test]
    fn test_cycles_through_ready() {
        use ProcessState::*;
        let t = table(&[Ready, Ready, Unused, Ready]);
        assert_eq!(select(&t, 0), 1);
        assert_eq!(select(&t, 1), 3);
        assert_eq!(select(&t, 3), 1);
    }

    #[test]
    fn test_idle_only_when_alone() {
        use ProcessState::*;
        let t = table(&[Running, Unused, Blocked, Unused]);
        assert_eq!(select(&t, 0), IDLE_PROCESS);
    }

    #[test]
    fn test_lone_process_keeps_cpu() {
        use ProcessState::*;
        let t = table(&[Ready, Unused, Running, Unused]);
        assert_eq!(select(&t, 2), 2);
    }
}
