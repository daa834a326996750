//! Chroma vector extraction
//!
//! Folds STFT power spectra into 12 pitch classes.
//!
//! Each FFT bin in the configured band is mapped to a fractional MIDI pitch,
//! `p = 69 + 12 * log2(f / center_frequency)`. With hard mapping the bin's power goes
//! entirely to pitch class `round(p) mod 12`; with soft mapping it is spread over
//! neighbouring pitch classes with Gaussian weights. Octaves fold together, so every C
//! lands in the C row. Each column is then normalized to a unit peak.

use super::normalization::{normalize_column, sharpen_chroma};
use super::{Chromagram, N_CHROMA};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::stft::Spectrogram;

/// Chroma extraction parameters
#[derive(Debug, Clone, Copy)]
pub struct ChromaParams {
    /// Tuning reference for A4 in Hz
    pub center_frequency: f32,
    /// Lowest frequency included
    pub min_frequency: f32,
    /// Highest frequency included
    pub max_frequency: f32,
    /// Gaussian spread in semitones, `None` for hard mapping
    pub soft_mapping_sigma: Option<f32>,
    /// Power applied to each normalized column
    pub sharpening_power: f32,
}

impl ChromaParams {
    /// Take the chroma fields from an analysis config
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            center_frequency: config.center_frequency,
            min_frequency: config.chroma_min_frequency,
            max_frequency: config.chroma_max_frequency,
            soft_mapping_sigma: config
                .soft_chroma_mapping
                .then_some(config.soft_mapping_sigma),
            sharpening_power: config.chroma_sharpening_power,
        }
    }
}

impl Default for ChromaParams {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// Extract a chromagram from a magnitude spectrogram
///
/// # Arguments
///
/// * `spectrogram` - Magnitude STFT
/// * `params` - Band, tuning and mapping parameters
///
/// # Returns
///
/// One normalized 12-element column per STFT frame
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a non-positive tuning reference or an empty band
pub fn extract_chroma(
    spectrogram: &Spectrogram,
    params: &ChromaParams,
) -> Result<Chromagram, AnalysisError> {
    if params.center_frequency <= 0.0 || params.min_frequency <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid chroma tuning: center={:.1} Hz, min={:.1} Hz",
            params.center_frequency, params.min_frequency
        )));
    }
    if params.max_frequency <= params.min_frequency {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid chroma band: [{:.1}, {:.1}] Hz",
            params.min_frequency, params.max_frequency
        )));
    }

    log::debug!(
        "Extracting chroma: {} frames, band [{:.1}, {:.1}] Hz, soft={:?}",
        spectrogram.n_frames(),
        params.min_frequency,
        params.max_frequency,
        params.soft_mapping_sigma
    );

    let filterbank = build_filterbank(spectrogram, params);

    let frames = spectrogram
        .frames
        .iter()
        .map(|magnitudes| {
            let mut column = [0.0f32; N_CHROMA];
            for (bin, weights) in &filterbank {
                let power = magnitudes[*bin] * magnitudes[*bin];
                for (c, &w) in column.iter_mut().zip(weights) {
                    *c += w * power;
                }
            }
            normalize_column(&mut column);
            sharpen_chroma(&mut column, params.sharpening_power);
            column
        })
        .collect();

    Ok(Chromagram::from_frames(
        frames,
        spectrogram.hop_size,
        spectrogram.sample_rate,
    ))
}

/// Pitch-class weights for every FFT bin inside the band
fn build_filterbank(
    spectrogram: &Spectrogram,
    params: &ChromaParams,
) -> Vec<(usize, [f32; N_CHROMA])> {
    (1..spectrogram.n_bins())
        .filter_map(|bin| {
            let freq = spectrogram.bin_frequency(bin);
            if freq < params.min_frequency || freq > params.max_frequency {
                return None;
            }

            let midi = 69.0 + 12.0 * (freq / params.center_frequency).log2();
            let weights = match params.soft_mapping_sigma {
                None => hard_weights(midi),
                Some(sigma) => soft_weights(midi, sigma),
            };
            Some((bin, weights))
        })
        .collect()
}

fn hard_weights(midi: f32) -> [f32; N_CHROMA] {
    let mut weights = [0.0f32; N_CHROMA];
    let pc = (midi.round() as i64).rem_euclid(N_CHROMA as i64) as usize;
    weights[pc] = 1.0;
    weights
}

fn soft_weights(midi: f32, sigma: f32) -> [f32; N_CHROMA] {
    let position = midi.rem_euclid(N_CHROMA as f32);
    let mut weights = [0.0f32; N_CHROMA];

    for (pc, w) in weights.iter_mut().enumerate() {
        // Circular distance in semitones, in [-6, 6]
        let mut d = position - pc as f32;
        if d > 6.0 {
            d -= 12.0;
        } else if d < -6.0 {
            d += 12.0;
        }
        *w = (-0.5 * (d / sigma).powi(2)).exp();
    }

    let total: f32 = weights.iter().sum();
    if total > 0.0 {
        weights.iter_mut().for_each(|w| *w /= total);
    }
    weights
}
