use ndarray::Array1;
use rustfft::{num_complex::Complex32, FftPlanner};

use crate::drivers::calibrate::to_voltage;
use crate::drivers::config::DisplayConfig;
use crate::drivers::frame::VertexSequence;
use crate::drivers::source::AcquisitionBlock;

/// Scale factor from raw transform magnitude to display amplitude.
const MAGNITUDE_GAIN: f32 = 5.0;

/// Blackman window coefficients for a block of `len` samples.
pub fn blackman(len: usize) -> Array1<f32> {
    let denom = (len - 1) as f32;
    Array1::from_shape_fn(len, |n| {
        let x = std::f32::consts::TAU * n as f32 / denom;
        0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
    })
}

/// Frequency-domain pipeline: windowed transform magnitudes, one vertex per
/// bin in the non-negative half of the spectrum.
///
/// The input is real-valued, so the magnitude spectrum is symmetric and only
/// the first half of the transform is plotted.
pub struct SpectrumBuilder<'a> {
    config: &'a DisplayConfig,
    window: Array1<f32>,
}

impl<'a> SpectrumBuilder<'a> {
    pub fn new(config: &'a DisplayConfig) -> Self {
        let window = blackman(config.block_len());
        Self { config, window }
    }

    pub fn magnitudes(&self, block: &AcquisitionBlock) -> VertexSequence {
        let cfg = self.config;
        let len = cfg.block_len();
        assert_eq!(block.len(), len, "acquisition block size mismatch");
        // Calibrate at unit gain; amplification scales the magnitudes.
        let samples = Array1::from_iter(block.iter().map(|&b| to_voltage(b, 1.0)));
        let windowed = &samples * &self.window;
        let mut buffer: Vec<Complex32> =
            windowed.iter().map(|&v| Complex32::new(v, 0.0)).collect();
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(len);
        fft.process(&mut buffer);
        buffer
            .iter()
            .take(len / 2)
            .enumerate()
            .map(|(k, c)| {
                let amplitude = c.norm() * MAGNITUDE_GAIN / len as f32 * cfg.amplification;
                [k as f32, cfg.center as f32 - amplitude]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::config::{DisplayMode, DEFAULT_DEVICE};

    fn config(amplification: f32) -> DisplayConfig {
        DisplayConfig::new(DisplayMode::Spectrum, DEFAULT_DEVICE, amplification, 1.0).unwrap()
    }

    fn sine_block(len: usize, bin: usize) -> Vec<u8> {
        (0..len)
            .map(|n| {
                let phase = std::f32::consts::TAU * ((bin * n) % len) as f32 / len as f32;
                (85.0 + 60.0 * phase.sin()).round() as u8
            })
            .collect()
    }

    #[test]
    fn blackman_window_shape() {
        let window = blackman(5);
        assert!(window[0].abs() < 1e-6);
        assert!(window[4].abs() < 1e-6);
        assert!((window[1] - 0.34).abs() < 1e-6);
        assert!((window[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn output_covers_the_non_negative_half_of_the_transform() {
        let cfg = config(1.0);
        let block = vec![85u8; cfg.block_len()];
        let vertices = SpectrumBuilder::new(&cfg).magnitudes(&block);
        assert_eq!(vertices.len(), cfg.width as usize);
        assert_eq!(vertices.len(), cfg.block_len() / 2);
    }

    #[test]
    fn pure_sine_peaks_at_its_own_bin() {
        let cfg = config(1.0);
        let block = sine_block(cfg.block_len(), 100);
        let vertices = SpectrumBuilder::new(&cfg).magnitudes(&block);
        let amplitude = |v: &[f32; 2]| cfg.center as f32 - v[1];
        let peak_bin = vertices
            .iter()
            .enumerate()
            .max_by(|a, b| amplitude(a.1).total_cmp(&amplitude(b.1)))
            .map(|(k, _)| k)
            .unwrap();
        assert_eq!(peak_bin, 100);
        let peak = amplitude(&vertices[100]);
        assert!(peak > 100.0 && peak < 140.0, "peak amplitude {peak}");
        // Outside the window mainlobe the spectrum is near-flat.
        for (k, vertex) in vertices.iter().enumerate() {
            if k.abs_diff(100) > 4 {
                assert!(
                    amplitude(vertex) < peak / 10.0,
                    "bin {k} leaks {}",
                    amplitude(vertex)
                );
            }
        }
    }

    #[test]
    fn amplification_scales_the_magnitudes() {
        let unit = config(1.0);
        let doubled = config(2.0);
        let block = sine_block(unit.block_len(), 40);
        let at_unit = SpectrumBuilder::new(&unit).magnitudes(&block);
        let at_double = SpectrumBuilder::new(&doubled).magnitudes(&block);
        let unit_amp = unit.center as f32 - at_unit[40][1];
        let double_amp = doubled.center as f32 - at_double[40][1];
        assert!((double_amp - 2.0 * unit_amp).abs() < 1e-2);
    }

    #[test]
    #[should_panic(expected = "acquisition block size mismatch")]
    fn wrong_block_length_is_an_invariant_violation() {
        let cfg = config(1.0);
        SpectrumBuilder::new(&cfg).magnitudes(&vec![85u8; 17]);
    }
}
