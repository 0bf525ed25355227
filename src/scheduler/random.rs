/*!
 * Random Strategy
 * Uniform choice among runnable non-idle processes
 */

use crate::core::limits::{IDLE_PROCESS, MAX_NUMBER_OF_PROCESSES};
use crate::core::types::ProcessId;
use crate::process::ProcessTable;
use rand::Rng;

pub fn select<R: Rng + ?Sized>(table: &ProcessTable, rng: &mut R) -> ProcessId {
    let mut candidates = [IDLE_PROCESS; MAX_NUMBER_OF_PROCESSES];
    let mut count = 0;

    for pid in table.runnable().filter(|&pid| pid != IDLE_PROCESS) {
        candidates[count] = pid;
        count += 1;
    }

    if count == 0 {
        return IDLE_PROCESS;
    }

    candidates[rng.gen_range(0..count)]
}
