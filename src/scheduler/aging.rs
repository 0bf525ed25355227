/*!
 * Inactive-Aging Strategy
 *
 * Waiting processes grow older by their priority plus one on every
 * dispatch. The oldest runnable process wins and starts over at age zero,
 * so high priorities come back sooner and nobody starves.
 */

use super::types::SchedulingInfo;
use crate::core::limits::IDLE_PROCESS;
use crate::core::types::ProcessId;
use crate::process::ProcessTable;

pub fn select(table: &ProcessTable, current: ProcessId, info: &mut SchedulingInfo) -> ProcessId {
    for (pid, process) in table.iter() {
        if pid != IDLE_PROCESS && pid != current && process.is_runnable() {
            let age = &mut info.age[pid as usize];
            *age = age.saturating_add(process.priority as u32 + 1);
        }
    }

    let winner = table
        .runnable()
        .filter(|&pid| pid != IDLE_PROCESS)
        .fold(None, |best: Option<ProcessId>, pid| match best {
            Some(best) if info.age[best as usize] >= info.age[pid as usize] => Some(best),
            _ => Some(pid),
        });

    match winner {
        Some(pid) => {
            info.age[pid as usize] = 0;
            pid
        }
        None => IDLE_PROCESS,
    }
}
