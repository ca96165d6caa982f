//! Custom error types for the wavemeter crate.
//!
//! `WlmError` covers everything that can go wrong between the caller and the
//! hardware, from configuration loading to a garbled counter response.
//!
//! ## Error Hierarchy
//!
//! - **`DriverUnavailable`** / **`MissingSymbol`**: the vendor library could not be
//!   loaded or does not export a required function. Fatal for live mode; there is
//!   no fallback backend.
//! - **`CounterUnavailable`**: the serial counter could not be opened. The counter
//!   session degrades to a permanent no-op, so this is logged rather than returned
//!   from constructors.
//! - **`TransientIo`**: a single poll of the counter failed (write, decode, parse).
//!   The state machine has already recovered when this is returned; callers may log
//!   it and carry on.
//! - **`Config`** / **`Configuration`**: figment extraction errors and semantic
//!   validation errors respectively.
//! - **`Io`**: wraps `std::io::Error`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type AppResult<T> = std::result::Result<T, WlmError>;

/// Step of the counter exchange that produced a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterStage {
    /// Sending the request command.
    Write,
    /// Asking the port how many bytes are waiting.
    Availability,
    /// Reading the waiting bytes.
    Read,
    /// Decoding the bytes as text.
    Decode,
    /// Parsing the leading frequency token.
    Parse,
}

impl fmt::Display for CounterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CounterStage::Write => "write",
            CounterStage::Availability => "availability",
            CounterStage::Read => "read",
            CounterStage::Decode => "decode",
            CounterStage::Parse => "parse",
        };
        f.write_str(name)
    }
}

/// Primary error type.
#[derive(Error, Debug)]
pub enum WlmError {
    #[error("Wavelength meter driver unavailable at '{}': {source}", .path.display())]
    DriverUnavailable {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Wavelength meter driver is missing symbol '{symbol}': {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("Frequency counter unavailable: {0}")]
    CounterUnavailable(String),

    #[error("Transient counter I/O failure during {stage}: {reason}")]
    TransientIo { stage: CounterStage, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WlmError {
    pub(crate) fn transient(stage: CounterStage, reason: impl fmt::Display) -> Self {
        WlmError::TransientIo {
            stage,
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for failures the counter state machine has already absorbed.
    pub fn is_transient(&self) -> bool {
        matches!(self, WlmError::TransientIo { .. })
    }
}
