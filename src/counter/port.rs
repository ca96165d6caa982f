//! Byte-stream access for the frequency counter.
//!
//! `CounterPort` is the minimal non-blocking surface the polling state machine
//! needs. The real implementation wraps a `serialport` handle opened with the
//! counter's fixed wiring (RTS low, DTR high).

use crate::config::CounterConfig;
use crate::error::{AppResult, WlmError};
use std::io;

/// Non-blocking byte stream to the counter.
pub trait CounterPort: Send {
    /// Number of bytes waiting to be read. Must not block.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read up to `buf.len()` waiting bytes.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write a complete request.
    fn write_request(&mut self, request: &[u8]) -> io::Result<()>;
}

#[cfg(feature = "instrument_serial")]
impl CounterPort for Box<dyn serialport::SerialPort> {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let waiting = self.bytes_to_read().map_err(io::Error::from)?;
        Ok(waiting as usize)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }

    fn write_request(&mut self, request: &[u8]) -> io::Result<()> {
        io::Write::write_all(self, request)?;
        io::Write::flush(self)
    }
}

/// Open the counter's serial port and set the control lines.
///
/// # Errors
///
/// `CounterUnavailable` if the port cannot be opened or configured.
#[cfg(feature = "instrument_serial")]
pub fn open_serial(config: &CounterConfig) -> AppResult<Box<dyn CounterPort>> {
    use tracing::debug;

    let mut port = serialport::new(&config.port, config.baud_rate)
        .timeout(config.timeout())
        .open()
        .map_err(|e| {
            WlmError::CounterUnavailable(format!(
                "failed to open '{}' at {} baud: {}",
                config.port, config.baud_rate, e
            ))
        })?;

    port.write_request_to_send(config.rts)
        .and_then(|_| port.write_data_terminal_ready(config.dtr))
        .map_err(|e| {
            WlmError::CounterUnavailable(format!(
                "failed to set control lines on '{}': {}",
                config.port, e
            ))
        })?;

    debug!(
        "Counter port '{}' opened at {} baud (RTS={}, DTR={})",
        config.port, config.baud_rate, config.rts, config.dtr
    );
    Ok(Box::new(port))
}

/// Serial support is compiled out; the counter is always unavailable.
#[cfg(not(feature = "instrument_serial"))]
pub fn open_serial(config: &CounterConfig) -> AppResult<Box<dyn CounterPort>> {
    Err(WlmError::CounterUnavailable(format!(
        "serial support not enabled, cannot open '{}'. Rebuild with --features instrument_serial",
        config.port
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonexistent_port_is_unavailable() {
        let config = CounterConfig {
            port: "/dev/definitely-not-a-counter".to_string(),
            ..CounterConfig::default()
        };
        match open_serial(&config) {
            Err(WlmError::CounterUnavailable(msg)) => {
                assert!(msg.contains("/dev/definitely-not-a-counter"))
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("opened a port that does not exist"),
        }
    }
}
