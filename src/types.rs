// src/types.rs
use crate::drivers::RenderFrame;

/// Messages the engine thread sends to the presentation layer.
#[derive(Debug)]
pub enum EngineMessage {
    /// A complete frame ready for a full clear-and-redraw.
    Frame(RenderFrame),
    /// Fatal acquisition fault; the window should close so the process can
    /// exit with the diagnostic.
    Fault(String),
    /// The engine finished its Stopping transition.
    Stopped,
}
