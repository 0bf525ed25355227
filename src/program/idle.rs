/*!
 * Idle Program
 * Owns all processor time no other process wants
 */

use crate::core::limits::DEFAULT_OUTPUT_DELAY_MS;
use crate::hal::{Delay, DisplayDriver, StdDelay, StdoutDisplay};

/// Text written on every heartbeat
pub const HEARTBEAT: &str = ".\n";

/// Entry point registered in program slot 0; never returns
pub fn idle_program() {
    let mut display = StdoutDisplay;
    let mut delay = StdDelay;
    loop {
        heartbeat(&mut display, &mut delay);
    }
}

/// One visible sign of life followed by the output delay
pub fn heartbeat<D: DisplayDriver, T: Delay>(display: &mut D, delay: &mut T) {
    display.write_string(HEARTBEAT);
    delay.delay_ms(DEFAULT_OUTPUT_DELAY_MS);
}
