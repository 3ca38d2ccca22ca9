use crate::drivers::calibrate::to_voltage;
use crate::drivers::config::DisplayConfig;
use crate::drivers::frame::VertexSequence;
use crate::drivers::source::AcquisitionBlock;

/// Time-domain pipeline: one calibrated vertex per display column.
///
/// Spans longer than 1 ms/div are decimated; column `x` picks sample
/// `floor(x * bwspan)`, so the displayed time per division stays `bwspan` ms
/// regardless of canvas width.
pub struct WaveformBuilder<'a> {
    config: &'a DisplayConfig,
}

impl<'a> WaveformBuilder<'a> {
    pub fn new(config: &'a DisplayConfig) -> Self {
        Self { config }
    }

    pub fn trace(&self, block: &AcquisitionBlock) -> VertexSequence {
        let cfg = self.config;
        // Block sizing is a fixed contract; a mismatch is a programming error.
        assert_eq!(block.len(), cfg.block_len(), "acquisition block size mismatch");
        (0..cfg.width)
            .map(|x| {
                let idx = (x as f32 * cfg.bw_ms_per_div).floor() as usize;
                let y = cfg.center as f32 - to_voltage(block[idx], cfg.amplification);
                [x as f32, y]
            })
            .collect()
    }
}
