//! Serial frequency counter polling.
//!
//! The counter answers a `D0\r` request with an ASCII line such as
//! `38434900 Hz\r\n`. The reply can take longer than one poll interval, so the
//! exchange is split into two phases driven by repeated calls to
//! [`CounterSession::poll`]:
//!
//! ```text
//!            write "D0\r" ok
//!   Idle ─────────────────────────▶ AwaitingResponse
//!    ▲  ▲                              │        │
//!    │  └── write failed               │        │ bytes <= threshold
//!    │                                 │        └──────────────▶ (stay)
//!    └──── bytes > threshold: read, parse (ok or not) ◀┘
//! ```
//!
//! `poll` never blocks: it only reads once enough bytes are already waiting.
//! Transient failures are returned as [`WlmError::TransientIo`] after the state
//! machine has recovered, so a caller can log them and keep polling.
//!
//! The reply is read as soon as more than the threshold number of bytes are
//! waiting, and everything waiting is read at once. A reply longer than the
//! threshold can therefore be cut mid-token: if `38434900.123 Hz\r\n` is
//! caught after eleven bytes, this cycle stores `38434900.12` and the leftover
//! `3 Hz\r\n` stays in the port buffer. The next cycle reads it in front of
//! the fresh reply, so its first token (`3`) is what gets stored then.
//!
//! A session whose port could not be opened is permanently disabled; polling it
//! is a no-op and the stored frequency stays at its initial `0.0`.

pub mod mock;
pub mod port;

pub use mock::{PortHandle, ScriptedPort};
pub use port::{open_serial, CounterPort};

use crate::config::CounterConfig;
use crate::error::{AppResult, CounterStage, WlmError};
use crate::measurement::{Measurement, Unit};
use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

/// Request command understood by the counter.
pub const REQUEST: &[u8] = b"D0\r";

/// A reply is complete once more than this many bytes are waiting.
pub const DEFAULT_RESPONSE_THRESHOLD: usize = 10;

/// Channel number used when tagging counter readings.
pub const COUNTER_CHANNEL: u32 = 0;

/// Position in the request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    /// No request outstanding.
    Idle,
    /// A request was sent and the reply is not complete yet.
    AwaitingResponse,
}

/// What a single successful poll did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// The session has no port; nothing happened.
    Disabled,
    /// A request was written.
    RequestSent,
    /// The reply is still incomplete.
    Pending {
        /// Bytes waiting at the time of the poll.
        available: usize,
    },
    /// A reply was parsed and stored.
    Updated(f64),
}

/// Polling state for one frequency counter.
pub struct CounterSession {
    port: Option<Box<dyn CounterPort>>,
    state: CounterState,
    frequency: f64,
    updated_at: Option<DateTime<Utc>>,
    response_threshold: usize,
}

impl std::fmt::Debug for CounterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterSession")
            .field("enabled", &self.is_enabled())
            .field("state", &self.state)
            .field("frequency", &self.frequency)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl CounterSession {
    /// Session over an already open port.
    pub fn new(port: Box<dyn CounterPort>) -> Self {
        Self {
            port: Some(port),
            state: CounterState::Idle,
            frequency: 0.0,
            updated_at: None,
            response_threshold: DEFAULT_RESPONSE_THRESHOLD,
        }
    }

    /// Session that never talks to hardware.
    pub fn disabled() -> Self {
        Self {
            port: None,
            state: CounterState::Idle,
            frequency: 0.0,
            updated_at: None,
            response_threshold: DEFAULT_RESPONSE_THRESHOLD,
        }
    }

    /// Open the configured serial port.
    ///
    /// Never fails: if the counter is disabled in the configuration or the port
    /// cannot be opened, a warning is logged and a disabled session is returned.
    pub fn open(config: &CounterConfig) -> Self {
        if !config.enabled {
            debug!("Frequency counter disabled in configuration");
            return Self::disabled();
        }

        match open_serial(config) {
            Ok(port) => Self::new(port).with_response_threshold(config.response_threshold),
            Err(e) => {
                warn!("Could not connect to frequency counter: {}", e);
                Self::disabled()
            }
        }
    }

    /// Override the completeness threshold.
    pub fn with_response_threshold(mut self, threshold: usize) -> Self {
        self.response_threshold = threshold;
        self
    }

    /// `false` if the port could not be opened.
    pub fn is_enabled(&self) -> bool {
        self.port.is_some()
    }

    /// Current exchange state.
    pub fn state(&self) -> CounterState {
        self.state
    }

    /// Last successfully parsed frequency in Hz, `0.0` before the first reply.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Last reply as a timestamped measurement, if any.
    pub fn last_reading(&self) -> Option<Measurement> {
        self.updated_at.map(|timestamp| Measurement {
            channel: COUNTER_CHANNEL,
            value: self.frequency,
            unit: Unit::Hertz,
            timestamp,
        })
    }

    /// Advance the exchange by one step.
    ///
    /// # Errors
    ///
    /// `TransientIo` when a write, read, decode or parse fails. The session has
    /// already moved to the state the next poll should start from.
    pub fn poll(&mut self) -> AppResult<PollOutcome> {
        let Some(port) = self.port.as_mut() else {
            trace!("Counter poll skipped, no port");
            return Ok(PollOutcome::Disabled);
        };

        match self.state {
            CounterState::Idle => match port.write_request(REQUEST) {
                Ok(()) => {
                    self.state = CounterState::AwaitingResponse;
                    trace!("Counter request sent");
                    Ok(PollOutcome::RequestSent)
                }
                Err(e) => {
                    debug!("Counter request failed, retrying on next poll: {}", e);
                    Err(WlmError::transient(CounterStage::Write, e))
                }
            },
            CounterState::AwaitingResponse => {
                let available = port.bytes_available().map_err(|e| {
                    debug!("Counter availability query failed: {}", e);
                    WlmError::transient(CounterStage::Availability, e)
                })?;

                if available <= self.response_threshold {
                    trace!("Counter reply incomplete ({} bytes)", available);
                    return Ok(PollOutcome::Pending { available });
                }

                // Whatever happens below, the next poll starts a fresh request.
                self.state = CounterState::Idle;

                let mut buf = vec![0u8; available];
                let read = port.read_available(&mut buf).map_err(|e| {
                    warn!("Could not get frequency counter value: {}", e);
                    WlmError::transient(CounterStage::Read, e)
                })?;
                buf.truncate(read);

                let value = parse_response(&buf).map_err(|e| {
                    warn!("Could not get frequency counter value: {}", e);
                    e
                })?;

                self.frequency = value;
                self.updated_at = Some(Utc::now());
                debug!("Counter frequency {} Hz", value);
                Ok(PollOutcome::Updated(value))
            }
        }
    }
}

/// Parse the leading frequency token of a counter reply.
///
/// # Errors
///
/// `TransientIo` at the `Decode` stage for non-UTF-8 input, or at the `Parse`
/// stage if the first whitespace-separated token is missing or not a number.
pub fn parse_response(bytes: &[u8]) -> AppResult<f64> {
    let text =
        std::str::from_utf8(bytes).map_err(|e| WlmError::transient(CounterStage::Decode, e))?;

    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| WlmError::transient(CounterStage::Parse, "empty response"))?;

    token.parse::<f64>().map_err(|e| {
        WlmError::transient(CounterStage::Parse, format!("'{}': {}", token, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn session() -> (CounterSession, PortHandle) {
        let (port, handle) = ScriptedPort::new();
        (CounterSession::new(Box::new(port)), handle)
    }

    fn stage_of(result: AppResult<PollOutcome>) -> CounterStage {
        match result {
            Err(WlmError::TransientIo { stage, .. }) => stage,
            other => panic!("expected transient failure, got {:?}", other),
        }
    }

    #[test]
    fn idle_poll_sends_request() {
        let (mut session, handle) = session();
        assert_eq!(session.state(), CounterState::Idle);

        assert_eq!(session.poll().unwrap(), PollOutcome::RequestSent);
        assert_eq!(session.state(), CounterState::AwaitingResponse);
        assert_eq!(handle.written(), b"D0\r");
    }

    #[test]
    fn incomplete_reply_keeps_waiting_without_reading() {
        let (mut session, handle) = session();
        session.poll().unwrap();

        handle.deliver(b"3843490");
        assert_eq!(
            session.poll().unwrap(),
            PollOutcome::Pending { available: 7 }
        );
        assert_eq!(session.state(), CounterState::AwaitingResponse);
        assert_eq!(session.frequency(), 0.0);
        assert_eq!(handle.pending(), 7);
    }

    #[test]
    fn exactly_threshold_bytes_is_still_incomplete() {
        let (mut session, handle) = session();
        session.poll().unwrap();

        handle.deliver(b"38434900 H");
        assert_eq!(
            session.poll().unwrap(),
            PollOutcome::Pending { available: 10 }
        );
        assert_eq!(session.state(), CounterState::AwaitingResponse);
    }

    #[test]
    fn complete_reply_updates_frequency() {
        let (mut session, handle) = session();
        session.poll().unwrap();

        handle.deliver(b"38434900 Hz\r\n");
        assert_eq!(session.poll().unwrap(), PollOutcome::Updated(38434900.0));
        assert_eq!(session.state(), CounterState::Idle);
        assert_eq!(session.frequency(), 38434900.0);
        assert_eq!(handle.pending(), 0);

        let reading = session.last_reading().unwrap();
        assert_eq!(reading.unit, Unit::Hertz);
        assert_eq!(reading.channel, COUNTER_CHANNEL);

        // next cycle starts with a fresh request
        assert_eq!(session.poll().unwrap(), PollOutcome::RequestSent);
        assert_eq!(handle.written(), b"D0\rD0\r");
    }

    #[test]
    #[traced_test]
    fn malformed_reply_returns_to_idle_and_keeps_value() {
        let (mut session, handle) = session();
        session.poll().unwrap();
        handle.deliver(b"12.5 Hz\r\n\r\n");
        session.poll().unwrap();
        assert_eq!(session.frequency(), 12.5);

        session.poll().unwrap();
        handle.deliver(b"OVERFLOW Hz\r\n");
        assert_eq!(stage_of(session.poll()), CounterStage::Parse);
        assert_eq!(session.state(), CounterState::Idle);
        assert_eq!(session.frequency(), 12.5);
        assert!(logs_contain("Could not get frequency counter value"));
    }

    #[test]
    fn undecodable_reply_is_a_decode_failure() {
        let (mut session, handle) = session();
        session.poll().unwrap();
        handle.deliver(&[0xff, 0xfe, 0xfd, 0x20, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37]);
        assert_eq!(stage_of(session.poll()), CounterStage::Decode);
        assert_eq!(session.state(), CounterState::Idle);
        assert_eq!(session.frequency(), 0.0);
    }

    #[test]
    fn failed_write_stays_idle_and_retries() {
        let (mut session, handle) = session();
        handle.fail_writes(1);

        assert_eq!(stage_of(session.poll()), CounterStage::Write);
        assert_eq!(session.state(), CounterState::Idle);
        assert!(handle.written().is_empty());

        assert_eq!(session.poll().unwrap(), PollOutcome::RequestSent);
        assert_eq!(session.state(), CounterState::AwaitingResponse);
    }

    #[test]
    #[traced_test]
    fn failed_read_returns_to_idle_and_keeps_value() {
        let (mut session, handle) = session();
        session.poll().unwrap();
        handle.deliver(b"12.5 Hz\r\n\r\n");
        session.poll().unwrap();
        assert_eq!(session.frequency(), 12.5);

        session.poll().unwrap();
        handle.deliver(b"99999999 Hz\r\n");
        handle.fail_reads(1);
        assert_eq!(stage_of(session.poll()), CounterStage::Read);
        assert_eq!(session.state(), CounterState::Idle);
        assert_eq!(session.frequency(), 12.5);
        assert!(logs_contain("Could not get frequency counter value"));

        assert_eq!(session.poll().unwrap(), PollOutcome::RequestSent);
        assert_eq!(handle.written(), b"D0\rD0\rD0\r");
    }

    #[test]
    fn long_reply_is_read_at_the_threshold_and_leftover_spills_over() {
        let (mut session, handle) = session();
        session.poll().unwrap();

        handle.deliver(b"38434900.12");
        assert_eq!(session.poll().unwrap(), PollOutcome::Updated(38434900.12));
        assert_eq!(handle.pending(), 0);

        session.poll().unwrap();
        handle.deliver(b"3 Hz\r\n38434900 Hz\r\n");
        assert_eq!(session.poll().unwrap(), PollOutcome::Updated(3.0));
        assert_eq!(session.state(), CounterState::Idle);
    }

    #[test]
    fn failed_availability_query_keeps_waiting() {
        let (mut session, handle) = session();
        session.poll().unwrap();
        handle.fail_availability(1);

        assert_eq!(stage_of(session.poll()), CounterStage::Availability);
        assert_eq!(session.state(), CounterState::AwaitingResponse);

        handle.deliver(b"1000000 Hz\r\n");
        assert_eq!(session.poll().unwrap(), PollOutcome::Updated(1_000_000.0));
    }

    #[test]
    fn disabled_session_is_inert() {
        let mut session = CounterSession::disabled();
        assert!(!session.is_enabled());
        for _ in 0..50 {
            assert_eq!(session.poll().unwrap(), PollOutcome::Disabled);
        }
        assert_eq!(session.state(), CounterState::Idle);
        assert_eq!(session.frequency(), 0.0);
        assert!(session.last_reading().is_none());
    }

    #[test]
    fn unopenable_port_degrades_to_disabled() {
        let config = CounterConfig {
            port: "/dev/definitely-not-a-counter".to_string(),
            ..CounterConfig::default()
        };
        let mut session = CounterSession::open(&config);
        assert!(!session.is_enabled());
        assert_eq!(session.poll().unwrap(), PollOutcome::Disabled);
    }

    #[test]
    fn parse_response_takes_first_token() {
        assert_eq!(parse_response(b"  5.5e6\tHz extra\r\n").unwrap(), 5.5e6);
        assert!(parse_response(b"   \r\n").is_err());
    }
}
