use std::collections::VecDeque;
use std::io::Read;
use std::time::Duration;

use log::debug;

use crate::drivers::calibrate::MIDPOINT;
use crate::drivers::error::ScopeError;

/// One fixed-length block of raw device bytes, read in a single transaction.
pub type AcquisitionBlock = Vec<u8>;

/// Something that can yield raw sample blocks on demand.
///
/// The device streams continuously and buffers internally, so a working read
/// may return stale data; `discard` flushes that backlog first. A short or
/// failed read is fatal at the render-cycle level.
pub trait SampleSource {
    /// Blocks until exactly `len` bytes of the stream have been read.
    fn acquire(&mut self, len: usize) -> Result<AcquisitionBlock, ScopeError>;

    /// Drops `reads` blocks of `chunk_len` bytes of buffered backlog so the
    /// next `acquire` reflects near-current signal.
    fn discard(&mut self, reads: usize, chunk_len: usize) -> Result<(), ScopeError> {
        for _ in 0..reads {
            self.acquire(chunk_len)?;
        }
        Ok(())
    }

    /// Releases the underlying device, if any.
    fn close(&mut self) {}
}

impl<T: SampleSource + ?Sized> SampleSource for Box<T> {
    fn acquire(&mut self, len: usize) -> Result<AcquisitionBlock, ScopeError> {
        (**self).acquire(len)
    }

    fn discard(&mut self, reads: usize, chunk_len: usize) -> Result<(), ScopeError> {
        (**self).discard(reads, chunk_len)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

const BAUD_RATE: u32 = 115_200;
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking byte stream from the serial-attached acquisition device.
pub struct SerialSource {
    port: Box<dyn serialport::SerialPort>,
    scratch: Vec<u8>,
}

impl SerialSource {
    pub fn open(device: &str) -> Result<Self, ScopeError> {
        let port = serialport::new(device, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| ScopeError::DeviceOpen {
                device: device.to_string(),
                source,
            })?;
        debug!("opened serial device {device}");
        Ok(Self {
            port,
            scratch: Vec::new(),
        })
    }
}

impl SampleSource for SerialSource {
    fn acquire(&mut self, len: usize) -> Result<AcquisitionBlock, ScopeError> {
        let mut block = vec![0u8; len];
        self.port.read_exact(&mut block)?;
        Ok(block)
    }

    fn discard(&mut self, reads: usize, chunk_len: usize) -> Result<(), ScopeError> {
        self.scratch.resize(chunk_len, 0);
        for _ in 0..reads {
            self.port.read_exact(&mut self.scratch)?;
        }
        debug!("flushed {} bytes of serial backlog", reads * chunk_len);
        Ok(())
    }

    fn close(&mut self) {
        // The handle is released on drop; this is the audit point.
        debug!("closing serial device");
    }
}

/// In-memory source for deterministic tests and playback.
pub struct ManualSource {
    queue: VecDeque<u8>,
}

impl ManualSource {
    pub fn new(bytes: impl IntoIterator<Item = u8>) -> Self {
        Self {
            queue: bytes.into_iter().collect(),
        }
    }
}

impl SampleSource for ManualSource {
    fn acquire(&mut self, len: usize) -> Result<AcquisitionBlock, ScopeError> {
        if self.queue.len() < len {
            return Err(ScopeError::DeviceRead(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "source exhausted",
            )));
        }
        Ok(self.queue.drain(..len).collect())
    }
}

/// Period of the built-in test tone, in samples.
pub const SIM_PERIOD: f32 = 52.0;
/// Peak deviation of the test tone from the midpoint, in counts.
pub const SIM_AMPLITUDE: f32 = 60.0;

/// Deterministic sine generator standing in for the hardware.
#[derive(Default)]
pub struct SimulatedSource {
    tick: u64,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn sample(tick: u64) -> u8 {
        let phase = std::f32::consts::TAU * (tick % SIM_PERIOD as u64) as f32 / SIM_PERIOD;
        (MIDPOINT + SIM_AMPLITUDE * phase.sin()).round() as u8
    }
}

impl SampleSource for SimulatedSource {
    fn acquire(&mut self, len: usize) -> Result<AcquisitionBlock, ScopeError> {
        let block = (0..len)
            .map(|i| Self::sample(self.tick + i as u64))
            .collect();
        self.tick += len as u64;
        // Pace redraws roughly like a real serial link would.
        std::thread::sleep(Duration::from_millis(5));
        Ok(block)
    }

    fn discard(&mut self, reads: usize, chunk_len: usize) -> Result<(), ScopeError> {
        // Nothing buffered to drain; just advance the stream position.
        self.tick += (reads * chunk_len) as u64;
        Ok(())
    }
}
