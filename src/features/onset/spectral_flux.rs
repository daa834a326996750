//! Spectral flux onset strength
//!
//! Algorithm:
//! 1. Convert each STFT magnitude frame to dB, flooring at 80 dB below the loudest bin
//! 2. Flux per frame: mean over bins of the positive dB increase since the previous frame
//! 3. Frame 0 has no predecessor and gets strength 0
//!
//! # Reference
//!
//! Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., & Sandler, M. B. (2005).
//! A Tutorial on Onset Detection in Music Signals.
//! *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.

use super::OnsetEnvelope;
use crate::features::stft::Spectrogram;

/// Magnitude floor before taking the log
const AMIN: f32 = 1e-5;

/// Dynamic range kept below the loudest bin
const TOP_DB: f32 = 80.0;

/// Compute the onset-strength envelope from a magnitude spectrogram
///
/// Silent input yields an all-zero envelope of the same length as the spectrogram.
pub fn onset_strength(spectrogram: &Spectrogram) -> OnsetEnvelope {
    log::debug!(
        "Computing spectral flux onset strength: {} frames",
        spectrogram.n_frames()
    );

    let db_frames: Vec<Vec<f32>> = spectrogram
        .frames
        .iter()
        .map(|frame| frame.iter().map(|&m| 20.0 * m.max(AMIN).log10()).collect())
        .collect();

    let max_db = db_frames
        .iter()
        .flat_map(|f| f.iter().copied())
        .fold(f32::NEG_INFINITY, f32::max);
    let floor_db = max_db - TOP_DB;

    let mut values = Vec::with_capacity(db_frames.len());
    if !db_frames.is_empty() {
        values.push(0.0);
    }

    for pair in db_frames.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let n_bins = curr.len().max(1);
        let rise: f32 = curr
            .iter()
            .zip(prev)
            .map(|(&c, &p)| (c.max(floor_db) - p.max(floor_db)).max(0.0))
            .sum();
        values.push(rise / n_bins as f32);
    }

    OnsetEnvelope {
        values,
        hop_size: spectrogram.hop_size,
        sample_rate: spectrogram.sample_rate,
    }
}
