//! Raw signatures for the HighFinesse `wlmData` library.
//!
//! The library is loaded at runtime, so this crate only describes the exported
//! symbols and their calling convention. Symbol names are NUL-terminated byte
//! strings suitable for `libloading::Library::get`.
//!
//! All exports use the Windows `stdcall` convention (`extern "system"`), and the
//! vendor's `long` is always 32 bits wide.

#![allow(non_upper_case_globals)]

/// The vendor `long` type.
pub type WlmLong = i32;

/// `double GetWavelengthNum(long num, double WL)`
pub type GetWavelengthNumFn = unsafe extern "system" fn(num: WlmLong, wl: f64) -> f64;

/// `double GetFrequencyNum(long num, double F)`
pub type GetFrequencyNumFn = unsafe extern "system" fn(num: WlmLong, f: f64) -> f64;

/// `bool GetExposureMode(bool EM)`
///
/// The C++ `bool` return is read as a byte; `1` means automatic exposure.
pub type GetExposureModeFn = unsafe extern "system" fn(em: bool) -> u8;

/// `long SetExposureMode(bool EM)`
pub type SetExposureModeFn = unsafe extern "system" fn(em: bool) -> WlmLong;

/// `long GetSwitcherMode(long SM)`
pub type GetSwitcherModeFn = unsafe extern "system" fn(sm: WlmLong) -> WlmLong;

/// `long SetSwitcherMode(long SM)`
pub type SetSwitcherModeFn = unsafe extern "system" fn(sm: WlmLong) -> WlmLong;

pub const GET_WAVELENGTH_NUM: &[u8] = b"GetWavelengthNum\0";
pub const GET_FREQUENCY_NUM: &[u8] = b"GetFrequencyNum\0";
pub const GET_EXPOSURE_MODE: &[u8] = b"GetExposureMode\0";
pub const SET_EXPOSURE_MODE: &[u8] = b"SetExposureMode\0";
pub const GET_SWITCHER_MODE: &[u8] = b"GetSwitcherMode\0";
pub const SET_SWITCHER_MODE: &[u8] = b"SetSwitcherMode\0";

// Measurement result sentinels returned in place of a wavelength or frequency.
pub const ErrNoValue: f64 = 0.0;
pub const ErrNoSignal: f64 = -1.0;
pub const ErrBadSignal: f64 = -2.0;
pub const ErrLowSignal: f64 = -3.0;
pub const ErrBigSignal: f64 = -4.0;
pub const ErrWlmMissing: f64 = -5.0;
pub const ErrNotAvailable: f64 = -6.0;
pub const InfNothingChanged: f64 = -7.0;
pub const ErrNoPulse: f64 = -8.0;
pub const ErrChannelNotAvailable: f64 = -10.0;
pub const ErrDiv0: f64 = -13.0;
pub const ErrOutOfRange: f64 = -14.0;
pub const ErrUnitNotAvailable: f64 = -15.0;

/// Returns `true` if `value` is one of the vendor error sentinels rather than a
/// measurement.
pub fn is_error_sentinel(value: f64) -> bool {
    value <= 0.0
}
