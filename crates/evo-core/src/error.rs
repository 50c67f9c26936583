//! Error types for the Evo DSP core

use thiserror::Error;

/// Core error type
///
/// The per-sample path never fails; these cover the checked entry points
/// (slice-based FFT, configuration parsing).
#[derive(Error, Debug)]
pub enum EvoError {
    #[error("FFT size must be a power of two, got {0}")]
    InvalidFftSize(usize),

    #[error("Buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias
pub type EvoResult<T> = Result<T, EvoError>;
