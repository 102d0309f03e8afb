// SPDX-License-Identifier: MIT

//! USART abstraction layer.
//!
//! Thin blocking transmit wrapper used for both the debug terminal and the
//! rover command/telemetry link.
//!
//! Note: When using `writeln!`, be sure to include `\r` (CR) in the format
//! string to ensure correct line endings on the terminal.
//!
//! To access the debug terminal on the host machine, connect to the debug
//! USB port and use
//! ```
//! $ screen /dev/tty.usbmodem* <baud_rate>
//! ```

use core::fmt;
use nb::block;

use stm32f4xx_hal::prelude::*;
use stm32f4xx_hal::serial::{Instance, Tx};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new(tx: Tx<U>) -> Self {
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    /// Transmit a raw byte frame (telemetry).
    pub fn write_frame(&mut self, frame: &[u8]) {
        for &b in frame {
            self.write_byte(b);
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }

    pub fn print_u32(&mut self, mut n: u32) {
        let mut buf = [0u8; 10];
        let mut i = buf.len();
        if n == 0 {
            self.write_byte(b'0');
            return;
        }
        while n > 0 {
            i -= 1;
            buf[i] = b'0' + (n % 10) as u8;
            n /= 10;
        }
        for &b in &buf[i..] {
            self.write_byte(b);
        }
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}
