/*!
 * Button Input
 *
 * Four push buttons on port C, active low:
 * C0 Enter, C1 Down, C6 Up, C7 Esc. Pins C2-C5 carry JTAG and are ignored.
 */

use bitflags::bitflags;

bitflags! {
    /// Pressed buttons, one bit each
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u8 {
        const ENTER = 0b0000_0001;
        const DOWN = 0b0000_0010;
        const UP = 0b0000_0100;
        const ESC = 0b0000_1000;
    }
}

/// Pin mask of the four button inputs on the port
pub const BUTTON_PINS: u8 = 0b1100_0011;

/// Raw port access
#[cfg_attr(test, mockall::automock)]
pub trait ButtonPort {
    /// Current pin levels of the port
    fn read_pins(&mut self) -> u8;
}

/// Translate raw pin levels into a button mask
///
/// Pressed pins read low. C0/C1 keep their position, C6/C7 move down to
/// bits 2 and 3.
pub fn decode_buttons(pins: u8) -> Buttons {
    let pressed = !pins & BUTTON_PINS;
    let low = pressed & 0b0000_0011;
    let high = (pressed & 0b1100_0000) >> 4;
    Buttons::from_bits_truncate(low | high)
}

/// Polling input driver
#[derive(Debug)]
pub struct InputDriver<P: ButtonPort> {
    port: P,
}

impl<P: ButtonPort> InputDriver<P> {
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Buttons pressed right now
    pub fn poll_buttons(&mut self) -> Buttons {
        decode_buttons(self.port.read_pins())
    }

    /// Spin until at least one button is pressed, returning what was seen
    pub fn wait_for_input(&mut self) -> Buttons {
        loop {
            let buttons = self.poll_buttons();
            if !buttons.is_empty() {
                return buttons;
            }
            std::hint::spin_loop();
        }
    }

    /// Spin until every button is released
    pub fn wait_for_no_input(&mut self) {
        while !self.poll_buttons().is_empty() {
            std::hint::spin_loop();
        }
    }
}
