//! Error types for the analysis pipeline
//!
//! Only two things abort a run: the recording cannot be loaded ([`LoadError`]) or the
//! caller handed in an invalid configuration. Recordings that are too short or silent for
//! a meaningful estimate are not errors; the affected estimate carries an
//! [`InsufficientData`](crate::analysis::result::InsufficientData) status instead.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a file path into a waveform
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The path does not exist
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read
    #[error("cannot read {}: {reason}", path.display())]
    Unreadable {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O or container error
        reason: String,
    },

    /// Container or codec not supported by this build
    #[error("unsupported format in {}: {reason}", path.display())]
    UnsupportedCodec {
        /// File that failed
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// Container holds no decodable audio track
    #[error("no audio track in {}", .0.display())]
    NoAudioTrack(PathBuf),

    /// Sample-rate conversion failed
    #[error("resampling failed: {0}")]
    Resample(String),
}

/// Errors that can occur during audio analysis
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// The recording could not be loaded; no later stage ran
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Processing error during analysis
    #[error("Processing error: {0}")]
    ProcessingError(String),

    /// Numerical error (overflow, non-finite values, etc.)
    #[error("Numerical error: {0}")]
    NumericalError(String),
}

impl AnalysisError {
    /// Returns the load failure, if this error is one
    pub fn as_load_error(&self) -> Option<&LoadError> {
        match self {
            AnalysisError::Load(e) => Some(e),
            _ => None,
        }
    }
}
