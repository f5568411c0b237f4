//! Serial alarm device
//!
//! Wraps the serial connection to the indicator hardware. The protocol is
//! minimal: write one magnitude as 4 raw bytes, then the device answers
//! with a single confirmation line.

use crate::types::{Magnitude, Result};
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

/// Longest acknowledgement line accepted from the device
const MAX_ACK_LEN: usize = 256;

/// Serial connection to the alarm hardware
///
/// Generic over the underlying stream so the send/ack protocol can be
/// exercised against an in-memory stream in tests; production code opens
/// a real port via [`AlarmDevice::open`].
pub struct AlarmDevice<T: Read + Write> {
    port: T,
}

impl AlarmDevice<Box<dyn SerialPort>> {
    /// Open the serial port and wait for the device to boot
    ///
    /// Opening the port resets Arduino-style boards, so the caller-supplied
    /// startup delay must cover the device's reboot time before the first
    /// magnitude is sent.
    ///
    /// # Arguments
    /// * `path` - serial device path, e.g. "/dev/ttyUSB0"
    /// * `baud` - baud rate
    /// * `timeout` - read timeout for acknowledgement lines
    /// * `startup_delay` - wait after opening before the port is usable
    pub fn open(
        path: &str,
        baud: u32,
        timeout: Duration,
        startup_delay: Duration,
    ) -> Result<Self> {
        let port = serialport::new(path, baud).timeout(timeout).open()?;
        log::info!(
            "Serial port {} open at {} baud, waiting {}s for device startup",
            path,
            baud,
            startup_delay.as_secs()
        );
        thread::sleep(startup_delay);
        Ok(Self { port })
    }
}

impl<T: Read + Write> AlarmDevice<T> {
    /// Wrap an already-open stream (used by tests)
    pub fn from_stream(port: T) -> Self {
        Self { port }
    }

    /// Send one magnitude to the device as 4 raw bytes
    pub fn send(&mut self, magnitude: Magnitude) -> Result<()> {
        let packed = magnitude.to_bytes();
        self.port.write_all(&packed)?;
        self.port.flush()?;
        Ok(())
    }

    /// Read one acknowledgement line from the device
    ///
    /// Reads until a newline, end of stream, or the serial timeout; the
    /// line is returned without its trailing newline. A timeout yields
    /// whatever was received so far (possibly empty) rather than an error,
    /// since a missed ack is not worth stopping the loop for.
    pub fn read_ack(&mut self) -> Result<String> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    line.push(byte[0]);
                    if line.len() >= MAX_ACK_LEN {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
        }

        let ack = String::from_utf8_lossy(&line);
        Ok(ack.trim_end_matches('\r').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MAGNITUDE_SUCCESS;

    /// In-memory stand-in for the serial port: records writes, replays
    /// canned read data.
    struct MockPort {
        written: Vec<u8>,
        to_read: io::Cursor<Vec<u8>>,
    }

    impl MockPort {
        fn new(to_read: &[u8]) -> Self {
            Self {
                written: Vec::new(),
                to_read: io::Cursor::new(to_read.to_vec()),
            }
        }
    }

    impl Read for MockPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.to_read.read(buf)
        }
    }

    impl Write for MockPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_send_writes_packed_magnitude() {
        let mut device = AlarmDevice::from_stream(MockPort::new(b""));
        let magnitude = Magnitude::from_status(Some("successful"));
        device.send(magnitude).unwrap();
        assert_eq!(device.port.written, MAGNITUDE_SUCCESS.to_le_bytes());
    }

    #[test]
    fn test_read_ack_returns_one_line() {
        let mut device = AlarmDevice::from_stream(MockPort::new(b"OK 5.0\r\nextra"));
        assert_eq!(device.read_ack().unwrap(), "OK 5.0");
    }

    #[test]
    fn test_read_ack_empty_stream() {
        let mut device = AlarmDevice::from_stream(MockPort::new(b""));
        assert_eq!(device.read_ack().unwrap(), "");
    }

    #[test]
    fn test_read_ack_without_newline() {
        // Device went quiet mid-line; partial ack is still returned
        let mut device = AlarmDevice::from_stream(MockPort::new(b"OK"));
        assert_eq!(device.read_ack().unwrap(), "OK");
    }
}
