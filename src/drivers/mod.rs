// src/drivers/mod.rs
pub mod calibrate;
pub mod config;
pub mod error;
pub mod frame;
pub mod grid;
pub mod plot;
pub mod scope;
pub mod source;
pub mod spectrum;

pub use config::{DisplayConfig, DisplayMode};
pub use error::ScopeError;
pub use frame::{RenderFrame, VertexSequence};
pub use grid::{GridLabel, GridLine, LineStyle};
pub use plot::render_frame_png;
pub use scope::WaveformBuilder;
pub use source::{
    AcquisitionBlock, ManualSource, SampleSource, SerialSource, SimulatedSource,
};
pub use spectrum::SpectrumBuilder;
