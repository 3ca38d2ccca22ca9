// src/cli.rs
use std::path::PathBuf;

use clap::Parser;

use crate::drivers::config::DEFAULT_DEVICE;
use crate::drivers::DisplayMode;

/// Serial-attached oscilloscope and spectrum analyzer.
#[derive(Parser, Debug)]
#[command(name = "ttyscope")]
#[command(about = "Renders a serial sample stream as a waveform or magnitude spectrum")]
pub struct Args {
    /// Serial device streaming raw 8-bit samples.
    #[arg(short = 'd', long, default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// Vertical gain applied to the calibrated trace.
    #[arg(short = 'a', long, default_value_t = 1.0)]
    pub amplification: f32,

    /// Milliseconds per horizontal division (oscilloscope only).
    #[arg(short = 'b', long = "bwmsperdiv", default_value_t = 1.0)]
    pub bw_ms_per_div: f32,

    /// Instrument front-end to run.
    #[arg(short = 'm', long, value_enum, default_value = "scope")]
    pub mode: DisplayMode,

    /// Use a built-in sine generator instead of the serial device.
    #[arg(long)]
    pub simulate: bool,

    /// Render a single frame to this PNG file and exit.
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Override the stale-data discard read count.
    #[arg(long, value_name = "N")]
    pub discard_reads: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn argument_surface_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_instrument_calibration() {
        let args = Args::parse_from(["ttyscope"]);
        assert_eq!(args.device, "/dev/ttyACM0");
        assert_eq!(args.amplification, 1.0);
        assert_eq!(args.bw_ms_per_div, 1.0);
        assert_eq!(args.mode, DisplayMode::Scope);
        assert!(!args.simulate);
    }

    #[test]
    fn short_flags_parse_like_the_long_forms() {
        let args = Args::parse_from([
            "ttyscope", "-d", "/dev/ttyUSB3", "-a", "2.5", "-b", "4", "-m", "spectrum",
        ]);
        assert_eq!(args.device, "/dev/ttyUSB3");
        assert_eq!(args.amplification, 2.5);
        assert_eq!(args.bw_ms_per_div, 4.0);
        assert_eq!(args.mode, DisplayMode::Spectrum);
    }
}
