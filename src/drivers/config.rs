use clap::ValueEnum;

use crate::drivers::error::ScopeError;

/// Which instrument front-end the run drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayMode {
    /// Time-domain waveform.
    Scope,
    /// Frequency-domain magnitude plot.
    Spectrum,
}

pub const DEFAULT_DEVICE: &str = "/dev/ttyACM0";

const SCOPE_CANVAS: (u32, u32) = (1300, 550);
const SPECTRUM_CANVAS: (u32, u32) = (1300, 380);
const SPECTRUM_CENTER: i32 = 360;

const SPECTRUM_DISCARD_READS: usize = 30;
/// Bytes per discard read in spectrum mode.
const SPECTRUM_DISCARD_CHUNK: usize = 8192;

/// Immutable per-run display and acquisition geometry.
///
/// Owned by the render driver and borrowed by the pipelines; fixed after
/// startup.
#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub mode: DisplayMode,
    pub device: String,
    pub amplification: f32,
    pub bw_ms_per_div: f32,
    pub width: u32,
    pub height: u32,
    /// Vertical pixel row that maps to 0 V.
    pub center: i32,
    /// Stale-data reads dropped before each working block.
    pub discard_reads: usize,
}

impl DisplayConfig {
    pub fn new(
        mode: DisplayMode,
        device: impl Into<String>,
        amplification: f32,
        bw_ms_per_div: f32,
    ) -> Result<Self, ScopeError> {
        if !amplification.is_finite() || amplification <= 0.0 {
            return Err(ScopeError::InvalidAmplification(amplification));
        }
        if !bw_ms_per_div.is_finite() || bw_ms_per_div <= 0.0 {
            return Err(ScopeError::InvalidSpan(bw_ms_per_div));
        }
        let (width, height) = match mode {
            DisplayMode::Scope => SCOPE_CANVAS,
            DisplayMode::Spectrum => SPECTRUM_CANVAS,
        };
        let center = match mode {
            DisplayMode::Scope => (height * 2 / 3) as i32,
            DisplayMode::Spectrum => SPECTRUM_CENTER,
        };
        let discard_reads = match mode {
            // Empirical flush count; +1 keeps the backlog drained when the
            // division ratio is exact.
            DisplayMode::Scope => (200.0 / bw_ms_per_div).ceil() as usize + 1,
            DisplayMode::Spectrum => SPECTRUM_DISCARD_READS,
        };
        Ok(Self {
            mode,
            device: device.into(),
            amplification,
            bw_ms_per_div,
            width,
            height,
            center,
            discard_reads,
        })
    }

    /// Overrides the stale-data flush count, the latency versus buffer-drain
    /// trade-off knob.
    pub fn with_discard_reads(mut self, reads: usize) -> Self {
        self.discard_reads = reads;
        self
    }

    /// Bytes in one working acquisition block.
    pub fn block_len(&self) -> usize {
        match self.mode {
            DisplayMode::Scope => (self.width as f32 * self.bw_ms_per_div).ceil() as usize,
            DisplayMode::Spectrum => 2 * self.width as usize,
        }
    }

    /// Bytes in one discard read.
    pub fn discard_chunk_len(&self) -> usize {
        match self.mode {
            DisplayMode::Scope => 2 * self.block_len(),
            DisplayMode::Spectrum => SPECTRUM_DISCARD_CHUNK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope_config(bw_ms_per_div: f32) -> DisplayConfig {
        DisplayConfig::new(DisplayMode::Scope, DEFAULT_DEVICE, 1.0, bw_ms_per_div).unwrap()
    }

    #[test]
    fn scope_discard_counts_match_tuning_table() {
        assert_eq!(scope_config(1.0).discard_reads, 201);
        assert_eq!(scope_config(4.0).discard_reads, 51);
        assert_eq!(scope_config(0.1).discard_reads, 2001);
    }

    #[test]
    fn spectrum_discard_is_fixed() {
        let config = DisplayConfig::new(DisplayMode::Spectrum, DEFAULT_DEVICE, 1.0, 1.0).unwrap();
        assert_eq!(config.discard_reads, 30);
        assert_eq!(config.discard_chunk_len(), 8192);
    }

    #[test]
    fn rejects_non_positive_or_non_finite_parameters() {
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(DisplayConfig::new(DisplayMode::Scope, "", bad, 1.0).is_err());
            assert!(DisplayConfig::new(DisplayMode::Scope, "", 1.0, bad).is_err());
        }
    }

    #[test]
    fn block_sizing_follows_mode_and_span() {
        assert_eq!(scope_config(1.0).block_len(), 1300);
        assert_eq!(scope_config(4.0).block_len(), 5200);
        assert_eq!(scope_config(0.1).block_len(), 130);
        assert_eq!(scope_config(1.0).discard_chunk_len(), 2600);
        let spectrum = DisplayConfig::new(DisplayMode::Spectrum, "", 1.0, 1.0).unwrap();
        assert_eq!(spectrum.block_len(), 2600);
    }

    #[test]
    fn canvas_geometry_per_mode() {
        let scope = scope_config(1.0);
        assert_eq!((scope.width, scope.height, scope.center), (1300, 550, 366));
        let spectrum = DisplayConfig::new(DisplayMode::Spectrum, "", 1.0, 1.0).unwrap();
        assert_eq!(
            (spectrum.width, spectrum.height, spectrum.center),
            (1300, 380, 360)
        );
    }

    #[test]
    fn discard_override_is_kept() {
        assert_eq!(scope_config(1.0).with_discard_reads(3).discard_reads, 3);
    }
}
