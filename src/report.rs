//! Text output for the command-line tool.

use crate::measurement::{Unit, MAX_CHANNEL};
use crate::source::MeasurementSource;

/// Channels printed in the diagnostic line after a readout.
pub const DIAGNOSTIC_CHANNELS: [u32; 3] = [2, 4, 6];

/// One readout line, e.g. `Wavelength at channel 1:\t460.8618 nm`.
pub fn format_channel_line(channel: u32, wavelength: f64) -> String {
    format!(
        "Wavelength at channel {}:\t{:.4} {}",
        channel,
        wavelength,
        Unit::Nanometers.symbol()
    )
}

/// Diagnostic line listing a few channels of a full sweep.
pub fn format_diagnostic(sweep: &[f64]) -> String {
    let values: Vec<f64> = DIAGNOSTIC_CHANNELS
        .iter()
        .filter_map(|ch| sweep.get(*ch as usize - 1).copied())
        .collect();
    format!("{:?}", values)
}

/// Read `channels` (or all channels when empty) and render the readout.
///
/// Every channel is read from a single sweep so the lines and the diagnostic
/// agree with each other.
pub fn readout(source: &mut MeasurementSource, channels: &[u32]) -> Vec<String> {
    let sweep = source.wavelengths_all();
    let requested: Vec<u32> = if channels.is_empty() {
        (1..=MAX_CHANNEL).collect()
    } else {
        channels.to_vec()
    };

    let mut lines: Vec<String> = requested
        .iter()
        .map(|&ch| {
            let value = ch
                .checked_sub(1)
                .and_then(|i| sweep.get(i as usize))
                .copied()
                .unwrap_or(0.0);
            format_channel_line(ch, value)
        })
        .collect();
    lines.push(format_diagnostic(&sweep));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_line_has_four_decimals() {
        assert_eq!(
            format_channel_line(3, 679.28884321),
            "Wavelength at channel 3:\t679.2888 nm"
        );
    }

    #[test]
    fn diagnostic_picks_even_channels() {
        let sweep = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(format_diagnostic(&sweep), "[2.0, 4.0, 6.0]");
    }

    #[test]
    fn invalid_requested_channel_prints_sentinel() {
        let mut source = MeasurementSource::simulated();
        let lines = readout(&mut source, &[0, 12]);
        assert_eq!(lines[0], "Wavelength at channel 0:\t0.0000 nm");
        assert_eq!(lines[1], "Wavelength at channel 12:\t0.0000 nm");
        assert_eq!(lines.len(), 3);
    }
}
