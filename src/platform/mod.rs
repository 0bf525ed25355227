/*!
 * Platform Abstraction
 * Context switching and interrupt control behind traits, plus a simulated MCU
 */

pub mod sim;
pub mod traits;

pub use sim::SimulatedAvr;
pub use traits::{ContextSwitch, FatalErrorReporter, InterruptControl, Platform};
