//! Readout library for a HighFinesse/Angstrom wavelength meter and a serial
//! frequency counter.
//!
//! The [`MeasurementSource`] hides whether readings come from the vendor
//! `wlmData` library, the serial counter, or the built-in simulation used in
//! debug mode.

pub mod config;
pub mod counter;
pub mod driver;
pub mod error;
pub mod logging;
pub mod measurement;
pub mod report;
pub mod source;

pub use config::Settings;
pub use error::{AppResult, WlmError};
pub use measurement::{Measurement, Snapshot, MAX_CHANNEL};
pub use source::{MeasurementSource, SourceMode};
