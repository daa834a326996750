//! Onset detection modules
//!
//! Per-frame onset strength on the STFT frame grid, shared by tempo estimation,
//! beat tracking and time-signature estimation.

pub mod spectral_flux;

pub use spectral_flux::onset_strength;

/// Onset-strength envelope, one non-negative value per STFT frame
#[derive(Debug, Clone)]
pub struct OnsetEnvelope {
    /// Onset strength per frame
    pub values: Vec<f32>,
    /// Hop size in samples between frames
    pub hop_size: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl OnsetEnvelope {
    /// Number of frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the envelope has no frames
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Frames per second
    pub fn frame_rate(&self) -> f32 {
        self.sample_rate as f32 / self.hop_size as f32
    }

    /// Time in seconds of frame `t`
    pub fn frame_time(&self, t: usize) -> f32 {
        t as f32 * self.hop_size as f32 / self.sample_rate as f32
    }
}
