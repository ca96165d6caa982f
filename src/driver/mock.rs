//! Mock driver for exercising the measurement source without the vendor library.
//!
//! Values are fixed per channel and mode changes are remembered. A shared call
//! counter lets tests check whether the source actually reached the driver.
//!
//! # Example
//!
//! ```rust
//! use wavemeter::driver::{MockDriver, WavemeterDriver};
//!
//! let driver = MockDriver::new().with_wavelength(2, 689.2643);
//! let calls = driver.call_counter();
//! assert_eq!(driver.wavelength(2), 689.2643);
//! assert_eq!(calls.get(), 1);
//! ```

use super::WavemeterDriver;
use crate::measurement::MAX_CHANNEL;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;

const SLOTS: usize = MAX_CHANNEL as usize + 1;

/// Shared view of how many driver calls have been made.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    /// Number of calls so far.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory wavelength meter.
#[derive(Debug)]
pub struct MockDriver {
    wavelengths: [f64; SLOTS],
    frequencies: [f64; SLOTS],
    exposure_mode: AtomicBool,
    switcher_mode: AtomicI32,
    calls: CallCounter,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// All channels read zero; exposure is automatic; switcher mode 0.
    pub fn new() -> Self {
        Self {
            wavelengths: [0.0; SLOTS],
            frequencies: [0.0; SLOTS],
            exposure_mode: AtomicBool::new(true),
            switcher_mode: AtomicI32::new(0),
            calls: CallCounter::default(),
        }
    }

    /// Set the value returned for `channel`'s wavelength.
    pub fn with_wavelength(mut self, channel: u32, value: f64) -> Self {
        if let Some(slot) = self.wavelengths.get_mut(channel as usize) {
            *slot = value;
        }
        self
    }

    /// Set the value returned for `channel`'s frequency.
    pub fn with_frequency(mut self, channel: u32, value: f64) -> Self {
        if let Some(slot) = self.frequencies.get_mut(channel as usize) {
            *slot = value;
        }
        self
    }

    /// Handle for observing calls after the driver has been boxed.
    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl WavemeterDriver for MockDriver {
    fn name(&self) -> &str {
        "mock"
    }

    fn wavelength(&self, channel: u32) -> f64 {
        self.calls.bump();
        self.wavelengths
            .get(channel as usize)
            .copied()
            .unwrap_or(wlm_sys::ErrChannelNotAvailable)
    }

    fn frequency(&self, channel: u32) -> f64 {
        self.calls.bump();
        self.frequencies
            .get(channel as usize)
            .copied()
            .unwrap_or(wlm_sys::ErrChannelNotAvailable)
    }

    fn exposure_mode(&self) -> bool {
        self.calls.bump();
        self.exposure_mode.load(Ordering::SeqCst)
    }

    fn set_exposure_mode(&self, enabled: bool) -> i32 {
        self.calls.bump();
        self.exposure_mode.store(enabled, Ordering::SeqCst);
        0
    }

    fn switcher_mode(&self) -> i32 {
        self.calls.bump();
        self.switcher_mode.load(Ordering::SeqCst)
    }

    fn set_switcher_mode(&self, mode: i32) -> i32 {
        self.calls.bump();
        self.switcher_mode.store(mode, Ordering::SeqCst);
        0
    }
}
