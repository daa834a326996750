//! Beat tracking modules
//!
//! Place beats on the onset-envelope frame grid and infer the meter from their accents:
//! - Dynamic-programming beat tracker
//! - Time-signature estimation by beat-accent periodicity

pub mod dynamic_programming;
pub mod time_signature;

pub use dynamic_programming::track_beats;
pub use time_signature::{estimate_time_signature, Meter, TimeSignatureEstimate};

use serde::Serialize;

/// Detected beats as strictly increasing frame indices
#[derive(Debug, Clone, Default, Serialize)]
pub struct BeatTrack {
    /// Beat positions in frames (same time base as the onset envelope)
    pub frames: Vec<usize>,
    /// Hop size in samples between frames
    pub hop_size: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl BeatTrack {
    /// Track with no beats on the given frame grid
    pub fn empty(hop_size: usize, sample_rate: u32) -> Self {
        Self {
            frames: vec![],
            hop_size,
            sample_rate,
        }
    }

    /// Number of beats
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no beats were detected
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of intervals between consecutive beats
    pub fn interval_count(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    /// Beat times in seconds
    pub fn times(&self) -> Vec<f32> {
        if self.sample_rate == 0 {
            return vec![];
        }
        let seconds_per_frame = self.hop_size as f32 / self.sample_rate as f32;
        self.frames
            .iter()
            .map(|&f| f as f32 * seconds_per_frame)
            .collect()
    }
}
