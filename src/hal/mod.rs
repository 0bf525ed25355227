/*!
 * Hardware Collaborators
 * Input, output and timing drivers consumed by programs running atop the scheduler
 */

pub mod delay;
pub mod display;
pub mod input;

pub use delay::{Delay, SimulatedDelay, StdDelay};
pub use display::{BufferedDisplay, DisplayDriver, StdoutDisplay};
pub use input::{decode_buttons, ButtonPort, Buttons, InputDriver};
