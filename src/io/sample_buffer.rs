//! The immutable mono waveform every analysis stage reads

use super::{decoder, resample};
use crate::error::LoadError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Mono sample buffer at a fixed sample rate
///
/// Created once per analysis run and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct WaveformBuffer {
    /// Sample data, normalized to [-1.0, 1.0]
    #[serde(skip)]
    samples: Vec<f32>,
    /// Sample rate in Hz
    sample_rate: u32,
    /// File the samples were decoded from, if any
    source: Option<PathBuf>,
}

impl WaveformBuffer {
    /// Wrap samples that are already mono and at `sample_rate`
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            source: None,
        }
    }

    /// Sample data
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Path the waveform was loaded from
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Load a file as mono samples at `target_sample_rate`
///
/// # Errors
///
/// Any [`LoadError`] from decoding or resampling. No partial buffer is returned.
pub fn load_waveform<P: AsRef<Path>>(
    path: P,
    target_sample_rate: u32,
) -> Result<WaveformBuffer, LoadError> {
    let path = path.as_ref();
    let decoded = decoder::decode_file(path)?;
    let samples = resample::resample(&decoded.samples, decoded.sample_rate, target_sample_rate)?;

    log::debug!(
        "Loaded {}: {} samples at {} Hz",
        path.display(),
        samples.len(),
        target_sample_rate
    );

    Ok(WaveformBuffer {
        samples,
        sample_rate: target_sample_rate,
        source: Some(path.to_path_buf()),
    })
}
