/*!
 * Run-to-Completion Strategy
 * The current process keeps the CPU until it stops being runnable
 */

use super::even;
use crate::core::limits::IDLE_PROCESS;
use crate::core::types::ProcessId;
use crate::process::ProcessTable;

pub fn select(table: &ProcessTable, current: ProcessId) -> ProcessId {
    if current != IDLE_PROCESS && table.is_runnable(current) {
        current
    } else {
        even::select(table, current)
    }
}
