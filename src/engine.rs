// src/engine.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, info};

use crate::drivers::{
    grid, DisplayConfig, DisplayMode, RenderFrame, SampleSource, ScopeError, SpectrumBuilder,
    WaveformBuilder,
};
use crate::types::EngineMessage;

/// Where the render loop hands finished frames.
pub trait Presenter {
    fn present(&mut self, frame: RenderFrame) -> Result<(), ScopeError>;

    /// Flushes and releases presentation resources; called exactly once on
    /// every exit path.
    fn close(&mut self) {}
}

/// Sends frames to the GUI thread over a channel.
pub struct ChannelPresenter {
    tx: Sender<EngineMessage>,
}

impl ChannelPresenter {
    pub fn new(tx: Sender<EngineMessage>) -> Self {
        Self { tx }
    }
}

impl Presenter for ChannelPresenter {
    fn present(&mut self, frame: RenderFrame) -> Result<(), ScopeError> {
        self.tx
            .send(EngineMessage::Frame(frame))
            .map_err(|_| ScopeError::PresenterClosed)
    }

    fn close(&mut self) {
        self.tx.send(EngineMessage::Stopped).ok();
    }
}

/// Presenter for one-shot offscreen rendering, where frames are taken from
/// `render_once` directly.
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _frame: RenderFrame) -> Result<(), ScopeError> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DriverState {
    Running,
    Stopping,
}

/// Drives the acquire, transform, overlay, present cycle.
///
/// One frame is built entirely from one acquisition block before the next
/// cycle begins. The stop flag is honored at the end of the discard phase
/// and at the end of each render; once Stopping is entered no further tick
/// is scheduled.
pub struct RenderDriver<S, P> {
    config: DisplayConfig,
    source: S,
    presenter: P,
    stop: Arc<AtomicBool>,
    state: DriverState,
}

impl<S: SampleSource, P: Presenter> RenderDriver<S, P> {
    pub fn new(config: DisplayConfig, source: S, presenter: P, stop: Arc<AtomicBool>) -> Self {
        Self {
            config,
            source,
            presenter,
            stop,
            state: DriverState::Running,
        }
    }

    /// Runs until stopped or a fatal acquisition fault.
    pub fn run(mut self) -> Result<(), ScopeError> {
        info!(
            "render loop started: {:?} {}x{}, block {} bytes, {} discard reads",
            self.config.mode,
            self.config.width,
            self.config.height,
            self.config.block_len(),
            self.config.discard_reads,
        );
        let result = self.drive();
        self.source.close();
        self.presenter.close();
        match &result {
            Ok(()) => info!("render loop stopped"),
            Err(e) => error!("render loop aborted: {e}"),
        }
        result
    }

    fn drive(&mut self) -> Result<(), ScopeError> {
        while self.state == DriverState::Running {
            match self.render_once()? {
                Some(frame) => {
                    if self.presenter.present(frame).is_err() {
                        // Presentation hang-up is a stop request, not a fault.
                        self.state = DriverState::Stopping;
                    }
                }
                None => self.state = DriverState::Stopping,
            }
            if self.stop.load(Ordering::Relaxed) {
                self.state = DriverState::Stopping;
            }
        }
        Ok(())
    }

    /// One full cycle; `None` when a stop request arrived mid-cycle.
    pub fn render_once(&mut self) -> Result<Option<RenderFrame>, ScopeError> {
        self.source
            .discard(self.config.discard_reads, self.config.discard_chunk_len())?;
        if self.stop.load(Ordering::Relaxed) {
            return Ok(None);
        }
        let block = self.source.acquire(self.config.block_len())?;
        debug!("acquired block of {} bytes", block.len());
        let vertices = match self.config.mode {
            DisplayMode::Scope => WaveformBuilder::new(&self.config).trace(&block),
            DisplayMode::Spectrum => SpectrumBuilder::new(&self.config).magnitudes(&block),
        };
        let grid = grid::overlay(&self.config);
        Ok(Some(RenderFrame { vertices, grid }))
    }
}

/// Spawns the render loop on its own thread, reporting faults to the GUI.
pub fn spawn(
    config: DisplayConfig,
    source: Box<dyn SampleSource + Send>,
    tx: Sender<EngineMessage>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<Result<(), ScopeError>> {
    thread::spawn(move || {
        let presenter = ChannelPresenter::new(tx.clone());
        let result = RenderDriver::new(config, source, presenter, stop).run();
        if let Err(e) = &result {
            tx.send(EngineMessage::Fault(e.to_string())).ok();
        }
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::drivers::config::DEFAULT_DEVICE;
    use crate::drivers::ManualSource;

    /// Stores frames and raises the stop flag once enough have arrived.
    struct CollectingPresenter {
        frames: Arc<Mutex<Vec<RenderFrame>>>,
        stop: Arc<AtomicBool>,
        stop_after: usize,
    }

    impl Presenter for CollectingPresenter {
        fn present(&mut self, frame: RenderFrame) -> Result<(), ScopeError> {
            let mut frames = self.frames.lock().unwrap();
            frames.push(frame);
            if frames.len() >= self.stop_after {
                self.stop.store(true, Ordering::Relaxed);
            }
            Ok(())
        }
    }

    fn scope_config() -> DisplayConfig {
        DisplayConfig::new(DisplayMode::Scope, DEFAULT_DEVICE, 1.0, 1.0)
            .unwrap()
            .with_discard_reads(2)
    }

    #[test]
    fn one_cycle_builds_a_coherent_frame_and_stops() {
        let cfg = scope_config();
        let backlog = cfg.discard_reads * cfg.discard_chunk_len();
        let mut bytes = vec![0u8; backlog];
        bytes.extend(vec![85u8; cfg.block_len()]);
        let source = ManualSource::new(bytes);

        let frames = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let presenter = CollectingPresenter {
            frames: frames.clone(),
            stop: stop.clone(),
            stop_after: 1,
        };
        RenderDriver::new(cfg.clone(), source, presenter, stop).run().unwrap();

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.vertices.len(), cfg.width as usize);
        // The working block comes after the discarded backlog, so the trace
        // is flat at the center even though the backlog was all zeros.
        assert!(frame.vertices.iter().all(|v| v[1] == cfg.center as f32));
        assert!(!frame.grid.is_empty());
    }

    #[test]
    fn acquisition_failure_aborts_the_loop() {
        let cfg = scope_config();
        let source = ManualSource::new(vec![0u8; 16]);
        let frames = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let presenter = CollectingPresenter {
            frames,
            stop: stop.clone(),
            stop_after: 1,
        };
        let result = RenderDriver::new(cfg, source, presenter, stop).run();
        assert!(matches!(result, Err(ScopeError::DeviceRead(_))));
    }

    #[test]
    fn pre_set_stop_flag_exits_after_the_discard_phase() {
        let cfg = scope_config().with_discard_reads(0);
        let source = ManualSource::new(Vec::new());
        let frames = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(true));
        let presenter = CollectingPresenter {
            frames: frames.clone(),
            stop: stop.clone(),
            stop_after: 1,
        };
        RenderDriver::new(cfg, source, presenter, stop).run().unwrap();
        assert!(frames.lock().unwrap().is_empty());
    }

    #[test]
    fn presenter_hangup_stops_instead_of_faulting() {
        let cfg = scope_config();
        let cycle = cfg.discard_reads * cfg.discard_chunk_len() + cfg.block_len();
        // Enough data for several cycles; the hang-up must stop the loop
        // after the first.
        let source = ManualSource::new(vec![85u8; 3 * cycle]);
        let (tx, rx) = std::sync::mpsc::channel();
        drop(rx);
        let stop = Arc::new(AtomicBool::new(false));
        let driver = RenderDriver::new(cfg, source, ChannelPresenter::new(tx), stop);
        assert!(driver.run().is_ok());
    }
}
