//! Channels and measurement values.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Highest optical channel on the wavelength meter.
pub const MAX_CHANNEL: u32 = 8;

/// Value returned for reads from channels outside `1..=MAX_CHANNEL`.
pub const OUT_OF_RANGE_SENTINEL: f64 = 0.0;

/// Returns `true` if `channel` addresses a physical input.
pub fn is_valid_channel(channel: u32) -> bool {
    (1..=MAX_CHANNEL).contains(&channel)
}

/// Every channel in sweep order.
pub fn all_channels() -> impl Iterator<Item = u32> {
    1..=MAX_CHANNEL
}

/// Physical unit of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Vacuum wavelength in nanometers.
    Nanometers,
    /// Frequency in hertz.
    Hertz,
}

impl Unit {
    /// Short symbol used in printed output.
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Nanometers => "nm",
            Unit::Hertz => "Hz",
        }
    }
}

/// A single reading tagged with the channel it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Source channel; the serial counter reports as channel 0.
    pub channel: u32,
    /// Raw value, including any driver error sentinel.
    pub value: f64,
    /// Unit of `value`.
    pub unit: Unit,
    /// When the value was captured.
    pub timestamp: DateTime<Utc>,
}

/// One-shot summary of the instrument state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Whether the values are simulated.
    pub debug: bool,
    /// Channel 1 wavelength in nm.
    pub wavelength: f64,
    /// Channel 1 frequency.
    pub frequency: f64,
    /// Automatic exposure enabled.
    #[serde(rename = "exposureMode")]
    pub exposure_mode: bool,
}

/// Format a capture time as `MM/DD/YYYY, HH:MM:SS.ffffff`.
pub fn format_capture_time(time: &DateTime<Local>) -> String {
    time.format("%m/%d/%Y, %H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn channel_bounds() {
        assert!(!is_valid_channel(0));
        assert!(is_valid_channel(1));
        assert!(is_valid_channel(8));
        assert!(!is_valid_channel(9));
        assert_eq!(all_channels().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn capture_time_has_microseconds() {
        let time = Local
            .with_ymd_and_hms(2024, 3, 7, 14, 5, 9)
            .unwrap()
            + chrono::Duration::microseconds(123_456);
        assert_eq!(format_capture_time(&time), "03/07/2024, 14:05:09.123456");
    }

    #[test]
    fn snapshot_uses_camel_case_exposure_key() {
        let snapshot = Snapshot {
            debug: true,
            wavelength: 460.8618,
            frequency: 38434900.0,
            exposure_mode: true,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["exposureMode"], true);
        assert_eq!(json["debug"], true);
    }
}
