//! Command-line readout for the wavelength meter.
//!
//! ```bash
//! # simulated readings for channels 1, 3 and 5
//! wavemeter --debug 1 3 5
//!
//! # live sweep of all channels as JSON summary
//! wavemeter --json
//!
//! # keep sweeping and polling the frequency counter until Ctrl-C
//! wavemeter --watch --interval-ms 250
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use wavemeter::config::{Settings, DEFAULT_CONFIG_PATH};
use wavemeter::measurement::{format_capture_time, Unit};
use wavemeter::{logging, report, MeasurementSource};

/// Reads out wavelength values from the HighFinesse Angstrom WS7 wavemeter.
#[derive(Parser, Debug)]
#[command(name = "wavemeter", version, about)]
struct Cli {
    /// Run in debug mode, simulating wavelength values
    #[arg(long)]
    debug: bool,

    /// Configuration file [default: config/wavemeter.toml, if present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON summary of channel 1 instead of the channel readout
    #[arg(long)]
    json: bool,

    /// Keep sweeping and polling the frequency counter until interrupted
    #[arg(long)]
    watch: bool,

    /// Poll interval for --watch
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    /// Stop --watch after this many sweeps
    #[arg(long)]
    samples: Option<u64>,

    /// Channels to read, by default all channels from 1 to 8
    #[arg(value_name = "CH")]
    channels: Vec<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::load()
            .with_context(|| format!("Failed to load settings from {}", DEFAULT_CONFIG_PATH))?,
    };
    settings.debug |= cli.debug;

    logging::init(&settings.log_level);

    let mut source = MeasurementSource::from_settings(&settings)
        .context("Failed to initialise the wavelength meter")?;

    if cli.json {
        let snapshot = source.snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    if cli.watch {
        return watch(&mut source, &cli.channels, cli.interval_ms, cli.samples).await;
    }

    for line in report::readout(&mut source, &cli.channels) {
        println!("{}", line);
    }
    Ok(())
}

/// Sweep on a fixed interval, advancing the counter once per tick.
async fn watch(
    source: &mut MeasurementSource,
    channels: &[u32],
    interval_ms: u64,
    samples: Option<u64>,
) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    let mut taken = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
        }

        let counter = source.counter_frequency();
        for line in report::readout(source, channels) {
            println!("{}", line);
        }
        println!(
            "Counter:\t{:.1} {}\t({})",
            counter,
            Unit::Hertz.symbol(),
            format_capture_time(&source.last_capture_time())
        );

        taken += 1;
        if samples.is_some_and(|limit| taken >= limit) {
            break;
        }
    }
    Ok(())
}
