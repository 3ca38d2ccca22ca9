use thiserror::Error;

/// Fault taxonomy for the acquisition and render pipeline.
///
/// Configuration faults are fatal at startup, acquisition faults are fatal at
/// the render-cycle level; there is no partial-frame recovery.
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("amplification must be a positive number, got {0}")]
    InvalidAmplification(f32),
    #[error("time per division must be a positive number of milliseconds, got {0}")]
    InvalidSpan(f32),
    #[error("failed to open serial device {device}: {source}")]
    DeviceOpen {
        device: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial read failed: {0}")]
    DeviceRead(#[from] std::io::Error),
    #[error("presentation layer hung up")]
    PresenterClosed,
    #[error("failed to render snapshot: {0}")]
    Snapshot(String),
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ScopeError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ScopeError::Snapshot(format!("{value:?}"))
    }
}

impl From<image::ImageError> for ScopeError {
    fn from(value: image::ImageError) -> Self {
        ScopeError::Snapshot(value.to_string())
    }
}
