//! Configuration loading using Figment.
//!
//! Settings are merged from, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. A TOML file (`config/wavemeter.toml` unless another path is given)
//! 3. Environment variables prefixed with `WAVEMETER_`
//!
//! Nested keys are separated with a double underscore:
//!
//! ```text
//! WAVEMETER_DEBUG=true
//! WAVEMETER_COUNTER__PORT=/dev/ttyUSB3
//! WAVEMETER_DRIVER__LIBRARY_PATH=/opt/highfinesse/libwlmData.so
//! ```
//!
//! # Example
//!
//! ```toml
//! debug = false
//! log_level = "info"
//!
//! [driver]
//! library_path = "C:\\Windows\\System32\\wlmData.dll"
//!
//! [counter]
//! port = "COM5"
//! baud_rate = 9600
//! timeout_ms = 1000
//! rts = false
//! dtr = true
//! ```

use crate::error::{AppResult, WlmError};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/wavemeter.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "WAVEMETER_";

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Use the simulated backend instead of the vendor library and counter.
    #[serde(default)]
    pub debug: bool,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Vendor library settings
    #[serde(default)]
    pub driver: DriverConfig,
    /// Serial frequency counter settings
    #[serde(default)]
    pub counter: CounterConfig,
}

/// Vendor library configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Path (or bare name for the loader search path) of the wlmData library
    #[serde(default = "default_library_path")]
    pub library_path: PathBuf,
}

/// Serial frequency counter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Try to open the counter at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Serial port (e.g., "COM5", "/dev/ttyUSB0")
    #[serde(default = "default_counter_port")]
    pub port: String,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// RTS line state asserted at open
    #[serde(default)]
    pub rts: bool,
    /// DTR line state asserted at open
    #[serde(default = "default_true")]
    pub dtr: bool,
    /// A response is complete once more than this many bytes are waiting
    #[serde(default = "default_response_threshold")]
    pub response_threshold: usize,
}

impl CounterConfig {
    /// Read timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(windows)]
fn default_library_path() -> PathBuf {
    PathBuf::from(r"C:\Windows\System32\wlmData.dll")
}

#[cfg(not(windows))]
fn default_library_path() -> PathBuf {
    PathBuf::from("libwlmData.so")
}

#[cfg(windows)]
fn default_counter_port() -> String {
    "COM5".to_string()
}

#[cfg(not(windows))]
fn default_counter_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_response_threshold() -> usize {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: default_log_level(),
            driver: DriverConfig::default(),
            counter: CounterConfig::default(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_counter_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            rts: false,
            dtr: true,
            response_threshold: default_response_threshold(),
        }
    }
}

// ============================================================================
// Configuration Loading and Validation
// ============================================================================

impl Settings {
    /// Load settings from the default file location and the environment.
    ///
    /// A missing default file is not an error; defaults and environment still
    /// apply.
    pub fn load() -> AppResult<Self> {
        Self::load_layered(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load settings from a specific TOML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, is malformed, or
    /// validation fails.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        std::fs::metadata(path).map_err(|e| {
            WlmError::Io(std::io::Error::new(
                e.kind(),
                format!("config file '{}': {}", path.display(), e),
            ))
        })?;
        Self::load_layered(path)
    }

    fn load_layered(path: &Path) -> AppResult<Self> {
        let settings: Self = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings after loading.
    pub fn validate(&self) -> AppResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(WlmError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.counter.baud_rate == 0 {
            return Err(WlmError::Configuration(
                "counter.baud_rate must be greater than zero".to_string(),
            ));
        }

        if self.counter.timeout_ms == 0 {
            return Err(WlmError::Configuration(
                "counter.timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
