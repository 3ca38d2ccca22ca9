// src/main.rs
mod cli;
mod drivers;
mod engine;
mod gui;
mod types;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use log::info;

use crate::drivers::{
    render_frame_png, DisplayConfig, DisplayMode, SampleSource, SerialSource, SimulatedSource,
};
use crate::engine::{NullPresenter, RenderDriver};

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::Args::parse();

    let mut config = DisplayConfig::new(
        args.mode,
        &args.device,
        args.amplification,
        args.bw_ms_per_div,
    )?;
    if let Some(reads) = args.discard_reads {
        config = config.with_discard_reads(reads);
    }

    let source: Box<dyn SampleSource + Send> = if args.simulate {
        info!("using the built-in sine source");
        Box::new(SimulatedSource::new())
    } else {
        Box::new(SerialSource::open(&config.device)?)
    };

    if let Some(path) = &args.snapshot {
        return snapshot(config, source, path);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();
    let engine = engine::spawn(config.clone(), source, tx, stop.clone());

    let title = match config.mode {
        DisplayMode::Scope => "ttyscope - oscilloscope",
        DisplayMode::Spectrum => "ttyscope - spectrum analyzer",
    };
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([config.width as f32, config.height as f32])
        .with_resizable(false)
        .with_title(title);
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let app = gui::ScopeApp::new(config, rx, stop.clone());
    eframe::run_native(title, options, Box::new(|_cc| Box::new(app)))
        .map_err(|e| anyhow!("presentation layer failed: {e}"))?;

    // The window is gone; wind the engine down and surface any fault it hit.
    stop.store(true, Ordering::Relaxed);
    engine
        .join()
        .map_err(|_| anyhow!("render engine panicked"))??;
    Ok(())
}

/// One-shot mode: a single discard-acquire-transform cycle rendered
/// offscreen to a PNG.
fn snapshot(
    config: DisplayConfig,
    source: Box<dyn SampleSource + Send>,
    path: &Path,
) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    let mut driver = RenderDriver::new(config.clone(), source, NullPresenter, stop);
    let frame = driver
        .render_once()?
        .ok_or_else(|| anyhow!("render cycle stopped before producing a frame"))?;
    let png = render_frame_png(&frame, config.width, config.height)?;
    std::fs::write(path, png).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote snapshot to {}", path.display());
    Ok(())
}
