//! Optical measurement backends.
//!
//! `WavemeterDriver` is the capability the measurement source calls into. The
//! vendor library, the simulation and the test mock all implement it, so the
//! source never knows which one it is talking to.
//!
//! Channel numbers are passed through unchecked; range checking happens in
//! [`MeasurementSource`](crate::source::MeasurementSource).

pub mod mock;
pub mod native;
pub mod simulated;

pub use mock::MockDriver;
pub use native::NativeDriver;
pub use simulated::SimulatedDriver;

/// Synchronous access to a wavelength meter.
///
/// Implementations may block for the duration of a hardware call. Error
/// conditions (no signal, overexposure, ...) are reported in-band as the vendor's
/// zero or negative sentinels and must be passed through untouched.
pub trait WavemeterDriver: Send {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Vacuum wavelength in nm on `channel`.
    fn wavelength(&self, channel: u32) -> f64;

    /// Optical frequency on `channel`.
    fn frequency(&self, channel: u32) -> f64;

    /// `true` when automatic exposure is enabled.
    fn exposure_mode(&self) -> bool;

    /// Enable or disable automatic exposure. Returns the driver status code.
    fn set_exposure_mode(&self, enabled: bool) -> i32;

    /// Current channel switcher mode.
    fn switcher_mode(&self) -> i32;

    /// Change the channel switcher mode. Returns the driver status code.
    fn set_switcher_mode(&self, mode: i32) -> i32;
}
