//! Vendor `wlmData` library backend.
//!
//! The library is opened with `libloading` and every export is resolved up
//! front, so a missing function fails construction instead of the first read.
//! The function pointers stay valid for as long as `_library` is alive.

#![allow(unsafe_code)]

use super::WavemeterDriver;
use crate::error::{AppResult, WlmError};
use libloading::Library;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use wlm_sys::{
    GetExposureModeFn, GetFrequencyNumFn, GetSwitcherModeFn, GetWavelengthNumFn,
    SetExposureModeFn, SetSwitcherModeFn, WlmLong,
};

/// Handle to the loaded vendor library.
pub struct NativeDriver {
    path: PathBuf,
    get_wavelength_num: GetWavelengthNumFn,
    get_frequency_num: GetFrequencyNumFn,
    get_exposure_mode: GetExposureModeFn,
    set_exposure_mode: SetExposureModeFn,
    get_switcher_mode: GetSwitcherModeFn,
    set_switcher_mode: SetSwitcherModeFn,
    // Must outlive the function pointers above.
    _library: Library,
}

impl NativeDriver {
    /// Load the vendor library from `path`.
    ///
    /// # Errors
    ///
    /// `DriverUnavailable` if the library cannot be opened, `MissingSymbol` if
    /// any required export is absent.
    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        info!("Loading wavelength meter driver from {}", path.display());

        // SAFETY: loading runs the library's initialisers; wlmData has no
        // preconditions beyond being the genuine vendor library.
        let library = unsafe { Library::new(&path) }.map_err(|source| {
            WlmError::DriverUnavailable {
                path: path.clone(),
                source,
            }
        })?;

        let driver = Self {
            get_wavelength_num: resolve(&library, wlm_sys::GET_WAVELENGTH_NUM)?,
            get_frequency_num: resolve(&library, wlm_sys::GET_FREQUENCY_NUM)?,
            get_exposure_mode: resolve(&library, wlm_sys::GET_EXPOSURE_MODE)?,
            set_exposure_mode: resolve(&library, wlm_sys::SET_EXPOSURE_MODE)?,
            get_switcher_mode: resolve(&library, wlm_sys::GET_SWITCHER_MODE)?,
            set_switcher_mode: resolve(&library, wlm_sys::SET_SWITCHER_MODE)?,
            path,
            _library: library,
        };

        debug!("Resolved all wlmData exports");
        Ok(driver)
    }

    /// Path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Copy a function pointer of type `T` out of `library`.
fn resolve<T: Copy>(library: &Library, symbol: &'static [u8]) -> AppResult<T> {
    // SAFETY: `T` is one of the wlm_sys signatures matching the vendor header
    // for `symbol`. The caller keeps `library` alive alongside the pointer.
    unsafe { library.get::<T>(symbol) }
        .map(|sym| *sym)
        .map_err(|source| WlmError::MissingSymbol {
            symbol: symbol_name(symbol),
            source,
        })
}

fn symbol_name(symbol: &'static [u8]) -> &'static str {
    let trimmed = symbol.strip_suffix(b"\0").unwrap_or(symbol);
    std::str::from_utf8(trimmed).unwrap_or("<non-utf8 symbol>")
}

fn to_wlm_long(value: u32) -> WlmLong {
    WlmLong::try_from(value).unwrap_or(WlmLong::MAX)
}

impl WavemeterDriver for NativeDriver {
    fn name(&self) -> &str {
        "wlmData"
    }

    fn wavelength(&self, channel: u32) -> f64 {
        // SAFETY: signature matches the vendor header; the second argument is
        // reserved and always 0.
        unsafe { (self.get_wavelength_num)(to_wlm_long(channel), 0.0) }
    }

    fn frequency(&self, channel: u32) -> f64 {
        // SAFETY: as above.
        unsafe { (self.get_frequency_num)(to_wlm_long(channel), 0.0) }
    }

    fn exposure_mode(&self) -> bool {
        // SAFETY: the argument is ignored by the library.
        unsafe { (self.get_exposure_mode)(false) == 1 }
    }

    fn set_exposure_mode(&self, enabled: bool) -> i32 {
        // SAFETY: plain value call.
        unsafe { (self.set_exposure_mode)(enabled) }
    }

    fn switcher_mode(&self) -> i32 {
        // SAFETY: the argument is reserved and always 0.
        unsafe { (self.get_switcher_mode)(0) }
    }

    fn set_switcher_mode(&self, mode: i32) -> i32 {
        // SAFETY: plain value call.
        unsafe { (self.set_switcher_mode)(mode) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_driver_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_wlmData.dll");
        match NativeDriver::load(&path) {
            Err(WlmError::DriverUnavailable { path: reported, .. }) => {
                assert_eq!(reported, path)
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("loaded a library that does not exist"),
        }
    }

    #[test]
    fn symbol_names_strip_terminator() {
        assert_eq!(symbol_name(wlm_sys::GET_WAVELENGTH_NUM), "GetWavelengthNum");
        assert_eq!(symbol_name(wlm_sys::SET_SWITCHER_MODE), "SetSwitcherMode");
    }

    #[test]
    fn channel_conversion_saturates() {
        assert_eq!(to_wlm_long(3), 3);
        assert_eq!(to_wlm_long(u32::MAX), WlmLong::MAX);
    }
}
