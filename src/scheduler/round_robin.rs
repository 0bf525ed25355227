/*!
 * Round-Robin Strategy
 *
 * The selected process keeps the CPU for as many consecutive dispatches as
 * its priority says (at least one), then the Even scan hands the CPU on.
 * The idle process never holds a slice.
 */

use super::even;
use super::types::SchedulingInfo;
use crate::core::limits::IDLE_PROCESS;
use crate::core::types::ProcessId;
use crate::process::ProcessTable;

pub fn select(table: &ProcessTable, current: ProcessId, info: &mut SchedulingInfo) -> ProcessId {
    if current != IDLE_PROCESS && table.is_runnable(current) && info.time_slice > 1 {
        info.time_slice -= 1;
        return current;
    }

    let next = even::select(table, current);
    info.time_slice = match table.get(next) {
        Some(process) if next != IDLE_PROCESS => process.priority.max(1),
        _ => 0,
    };
    next
}
