// src/error.rs
//
// Error type shared by every numerical entry point.

use thiserror::Error;

/// Failures raised by the filter, taper and transform kernels.
///
/// All of them are reported before any work is done; there is no partial
/// result to unwind.
#[derive(Debug, Error)]
pub enum DspError {
    /// Zero-length signal, zero sample rate, too many tapers and the like.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `lo >= hi` for a pass filter, or `bin_lo > bin_hi`.
    #[error("invalid band: {lo} .. {hi}")]
    InvalidBand { lo: f64, hi: f64 },

    /// Band edge outside `[0, Nyquist]`.
    #[error("{what} = {value} is outside [0, {limit}]")]
    OutOfRange {
        what: &'static str,
        value: f64,
        limit: f64,
    },

    /// FFT-domain filter built for a different length than the signal.
    #[error("length mismatch: expected {expected} samples, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// IIR design requested for a degenerate band.
    #[error("unsupported IIR band: lo = {lo} Hz, hi = {hi} Hz")]
    UnsupportedBand { lo: f64, hi: f64 },

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("real FFT backend error: {0}")]
    Backend(#[from] realfft::FftError),

    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DspError>;

impl DspError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DspError::InvalidInput(msg.into())
    }
}
