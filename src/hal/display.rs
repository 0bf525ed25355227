/*!
 * Display Driver
 * Text output consumed by programs and the idle heartbeat
 */

use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Text output device
#[cfg_attr(test, mockall::automock)]
pub trait DisplayDriver {
    /// Write text at the cursor
    fn write_string(&mut self, text: &str);

    /// Blank the screen
    fn clear(&mut self) {}
}

/// Writes to the host's standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutDisplay;

impl DisplayDriver for StdoutDisplay {
    fn write_string(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        // Best effort, the LCD has no feedback either
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

/// Captures output in a shared buffer; clones see the same text
#[derive(Debug, Default, Clone)]
pub struct BufferedDisplay {
    buffer: Arc<Mutex<String>>,
}

impl BufferedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written since the last clear
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }
}

impl DisplayDriver for BufferedDisplay {
    fn write_string(&mut self, text: &str) {
        self.buffer.lock().push_str(text);
    }

    fn clear(&mut self) {
        self.buffer.lock().clear();
    }
}
