use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,
    #[error("channel {label} capture length mismatch: expected {expected}, got {actual}")]
    CaptureLengthMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },
    #[error("channel {0} has no samples")]
    EmptySignal(String),
    #[error("plot kinds must be a non-empty subset of time, spectrogram, fft in that order")]
    KindOrder,
    #[error("window size not defined for {rows} rows x {cols} columns")]
    UnsupportedWindowSize { rows: usize, cols: usize },
    #[error("subplot spacing not defined for {kinds} at {rows} rows x {cols} columns")]
    UnsupportedSpacing {
        kinds: String,
        rows: usize,
        cols: usize,
    },
    #[error("failed to render plot: {0}")]
    Draw(String),
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for PlotError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        PlotError::Draw(format!("{value:?}"))
    }
}

impl From<image::ImageError> for PlotError {
    fn from(value: image::ImageError) -> Self {
        PlotError::Draw(value.to_string())
    }
}
