//! Simulated wavelength meter for running without hardware.
//!
//! Channels 1-5 report a fixed base wavelength plus a small uniform jitter that
//! grows with the channel number; channels above 5 read as zero, like an
//! unconnected input.

use super::WavemeterDriver;
use rand::Rng;

/// Base wavelengths in nm for channels 1-5. Channel 5 is the second harmonic
/// partner of channel 1.
pub const BASE_WAVELENGTHS: [f64; 5] = [
    460.8618,
    689.2643,
    679.2888,
    707.2016,
    460.8618 * 2.0,
];

/// Frequency reported for every channel.
pub const SIMULATED_FREQUENCY: f64 = 38_434_900.0;

/// Jitter bound per channel index.
pub const JITTER_PER_CHANNEL: f64 = 0.0001;

/// Stateless simulation backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedDriver;

impl SimulatedDriver {
    /// Create a new simulated backend.
    pub fn new() -> Self {
        Self
    }

    /// Base wavelength for `channel`, or `None` if the channel is dark.
    pub fn base(channel: u32) -> Option<f64> {
        let index = usize::try_from(channel).ok()?.checked_sub(1)?;
        BASE_WAVELENGTHS.get(index).copied()
    }

    /// Simulated wavelength in nm.
    pub fn read(&self, channel: u32) -> f64 {
        match Self::base(channel) {
            Some(base) => {
                let jitter = rand::thread_rng().gen_range(0.0..=JITTER_PER_CHANNEL);
                base + f64::from(channel) * jitter
            }
            None => 0.0,
        }
    }
}

impl WavemeterDriver for SimulatedDriver {
    fn name(&self) -> &str {
        "simulated"
    }

    fn wavelength(&self, channel: u32) -> f64 {
        self.read(channel)
    }

    fn frequency(&self, _channel: u32) -> f64 {
        SIMULATED_FREQUENCY
    }

    fn exposure_mode(&self) -> bool {
        true
    }

    fn set_exposure_mode(&self, _enabled: bool) -> i32 {
        0
    }

    fn switcher_mode(&self) -> i32 {
        0
    }

    fn set_switcher_mode(&self, _mode: i32) -> i32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_stay_within_jitter_bound() {
        let driver = SimulatedDriver::new();
        for channel in 1..=5u32 {
            let base = SimulatedDriver::base(channel).unwrap();
            let upper = base + JITTER_PER_CHANNEL * f64::from(channel);
            for _ in 0..200 {
                let value = driver.read(channel);
                assert!(
                    (base..=upper).contains(&value),
                    "channel {} read {} outside [{}, {}]",
                    channel,
                    value,
                    base,
                    upper
                );
            }
        }
    }

    #[test]
    fn dark_channels_read_zero() {
        let driver = SimulatedDriver::new();
        for channel in [0, 6, 7, 8, 9, 100] {
            assert_eq!(driver.read(channel), 0.0);
        }
    }

    #[test]
    fn channel_five_doubles_channel_one() {
        assert_eq!(
            SimulatedDriver::base(5).unwrap(),
            2.0 * SimulatedDriver::base(1).unwrap()
        );
    }

    #[test]
    fn modes_are_fixed() {
        let driver = SimulatedDriver::new();
        assert!(driver.exposure_mode());
        assert_eq!(driver.set_exposure_mode(false), 0);
        assert!(driver.exposure_mode());
        assert_eq!(driver.set_switcher_mode(1), 0);
        assert_eq!(driver.switcher_mode(), 0);
        assert_eq!(driver.frequency(3), SIMULATED_FREQUENCY);
    }
}
