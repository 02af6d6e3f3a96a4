use thiserror::Error;

/// Rejected analysis parameters.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("window size must be at least 2 samples, got {0}")]
    WindowTooSmall(usize),
    #[error("frame rate must be positive")]
    ZeroFps,
    #[error("sample rate must be positive")]
    ZeroSampleRate,
    #[error("invalid frequency band: {min} Hz .. {max} Hz")]
    InvalidBand { min: f64, max: f64 },
    #[error("decibel reference must be positive and finite, got {0}")]
    InvalidReference(f64),
}
