//! Measurement source: one read interface over the optical and counter backends.
//!
//! In debug mode the source reads from [`SimulatedDriver`] and the counter is
//! disabled. In live mode it reads from a [`WavemeterDriver`] (normally the
//! vendor library) and polls the serial counter. The mode is fixed at
//! construction.
//!
//! Reads from channels outside `1..=8` return `0.0` without touching the
//! backend and leave the capture time alone. Every backend call, simulated or
//! live, stamps the capture time right after it returns.
//!
//! The counter is polled independently of the optical reads; its value may lag
//! behind the last wavelength.
//!
//! # Example
//!
//! ```rust
//! use wavemeter::MeasurementSource;
//!
//! let mut source = MeasurementSource::simulated();
//! let nm = source.wavelength(1);
//! assert!(nm > 460.0 && nm < 461.0);
//! assert_eq!(source.wavelength(9), 0.0);
//! ```

use crate::config::Settings;
use crate::counter::{CounterSession, CounterState, PollOutcome};
use crate::driver::{NativeDriver, SimulatedDriver, WavemeterDriver};
use crate::error::AppResult;
use crate::measurement::{
    all_channels, is_valid_channel, Measurement, Snapshot, Unit, OUT_OF_RANGE_SENTINEL,
};
use chrono::{DateTime, Local, Utc};
use tracing::{debug, info};

/// Backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Simulated wavelengths, no hardware.
    Debug,
    /// Vendor driver plus serial counter.
    Live,
}

/// Uniform access to the wavelength meter and frequency counter.
pub struct MeasurementSource {
    mode: SourceMode,
    driver: Box<dyn WavemeterDriver>,
    counter: CounterSession,
    last_capture: DateTime<Local>,
}

impl std::fmt::Debug for MeasurementSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementSource")
            .field("mode", &self.mode)
            .field("driver", &self.driver.name())
            .field("counter", &self.counter)
            .field("last_capture", &self.last_capture)
            .finish()
    }
}

impl MeasurementSource {
    /// Build the source described by `settings`.
    ///
    /// # Errors
    ///
    /// In live mode, fails if the vendor library cannot be loaded. A missing
    /// counter only disables the counter.
    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        if settings.debug {
            info!("Debug mode: simulating wavelength meter readings");
            return Ok(Self::simulated());
        }

        let driver = NativeDriver::load(&settings.driver.library_path)?;
        info!("Wavelength meter driver loaded from {}", driver.path().display());
        let counter = CounterSession::open(&settings.counter);
        Ok(Self::live(Box::new(driver), counter))
    }

    /// Debug-mode source.
    pub fn simulated() -> Self {
        Self {
            mode: SourceMode::Debug,
            driver: Box::new(SimulatedDriver::new()),
            counter: CounterSession::disabled(),
            last_capture: Local::now(),
        }
    }

    /// Live-mode source over an injected driver and counter session.
    pub fn live(driver: Box<dyn WavemeterDriver>, counter: CounterSession) -> Self {
        debug!(
            "Live source using '{}' driver, counter {}",
            driver.name(),
            if counter.is_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        );
        Self {
            mode: SourceMode::Live,
            driver,
            counter,
            last_capture: Local::now(),
        }
    }

    /// Backend selection.
    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    /// `true` when readings are simulated.
    pub fn is_debug(&self) -> bool {
        self.mode == SourceMode::Debug
    }

    /// Run a driver call, stamping the capture time once it returns.
    fn capture<T>(&mut self, call: impl FnOnce(&dyn WavemeterDriver) -> T) -> T {
        let value = call(self.driver.as_ref());
        self.last_capture = Local::now();
        value
    }

    /// Wavelength in nm on `channel`, or `0.0` for an invalid channel.
    pub fn wavelength(&mut self, channel: u32) -> f64 {
        if !is_valid_channel(channel) {
            return OUT_OF_RANGE_SENTINEL;
        }
        self.capture(|driver| driver.wavelength(channel))
    }

    /// Wavelength on channel 1.
    pub fn primary_wavelength(&mut self) -> f64 {
        self.wavelength(1)
    }

    /// Wavelengths for channels 1 through 8, in order.
    pub fn wavelengths_all(&mut self) -> Vec<f64> {
        all_channels().map(|ch| self.wavelength(ch)).collect()
    }

    /// Frequency on `channel`, or `0.0` for an invalid channel.
    pub fn frequency(&mut self, channel: u32) -> f64 {
        if !is_valid_channel(channel) {
            return OUT_OF_RANGE_SENTINEL;
        }
        self.capture(|driver| driver.frequency(channel))
    }

    /// Wavelength on `channel` tagged with channel and capture time.
    ///
    /// `None` for an invalid channel, since nothing was captured.
    pub fn measure_wavelength(&mut self, channel: u32) -> Option<Measurement> {
        if !is_valid_channel(channel) {
            return None;
        }
        let value = self.wavelength(channel);
        Some(Measurement {
            channel,
            value,
            unit: Unit::Nanometers,
            timestamp: self.last_capture.with_timezone(&Utc),
        })
    }

    /// `true` when automatic exposure is enabled.
    pub fn exposure_mode(&mut self) -> bool {
        self.capture(|driver| driver.exposure_mode())
    }

    /// Enable or disable automatic exposure. Returns the driver status code.
    pub fn set_exposure_mode(&mut self, enabled: bool) -> i32 {
        self.capture(|driver| driver.set_exposure_mode(enabled))
    }

    /// Current switcher mode.
    pub fn switcher_mode(&mut self) -> i32 {
        self.capture(|driver| driver.switcher_mode())
    }

    /// Change the switcher mode.
    pub fn set_switcher_mode(&mut self, mode: i32) {
        let status = self.capture(|driver| driver.set_switcher_mode(mode));
        debug!("SetSwitcherMode({}) returned {}", mode, status);
    }

    /// Wall-clock time of the most recent backend call.
    pub fn last_capture_time(&self) -> DateTime<Local> {
        self.last_capture
    }

    /// Advance the counter exchange by one step.
    ///
    /// # Errors
    ///
    /// Transient counter failures; the counter has already recovered.
    pub fn poll_counter(&mut self) -> AppResult<PollOutcome> {
        self.counter.poll()
    }

    /// Advance the counter one step and return the latest stored frequency.
    ///
    /// Transient failures are swallowed here; the stored value simply stays
    /// stale.
    pub fn counter_frequency(&mut self) -> f64 {
        if let Err(e) = self.counter.poll() {
            debug!("Counter poll absorbed: {}", e);
        }
        self.counter.frequency()
    }

    /// Exchange state of the counter.
    pub fn counter_state(&self) -> CounterState {
        self.counter.state()
    }

    /// `false` if the counter is absent or disabled.
    pub fn counter_enabled(&self) -> bool {
        self.counter.is_enabled()
    }

    /// Channel 1 wavelength, frequency and exposure mode in one summary.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot {
            debug: self.is_debug(),
            wavelength: self.primary_wavelength(),
            frequency: self.frequency(1),
            exposure_mode: self.exposure_mode(),
        }
    }
}
