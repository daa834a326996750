//! Chroma extraction modules
//!
//! Extract pitch-class distribution (12 semitones) from the STFT:
//! - Chroma vector computation
//! - Column normalization and sharpening

pub mod extractor;
pub mod normalization;

pub use extractor::{extract_chroma, ChromaParams};

use crate::analysis::result::PitchClass;
use serde::Serialize;

/// Number of pitch classes (chromagram rows)
pub const N_CHROMA: usize = 12;

/// 12 × N pitch-class energy matrix, stored column-major (one `[f32; 12]` per frame)
#[derive(Debug, Clone, Serialize)]
pub struct Chromagram {
    frames: Vec<[f32; N_CHROMA]>,
    hop_size: usize,
    sample_rate: u32,
}

impl Chromagram {
    /// Build from per-frame columns
    pub fn from_frames(frames: Vec<[f32; N_CHROMA]>, hop_size: usize, sample_rate: u32) -> Self {
        Self {
            frames,
            hop_size,
            sample_rate,
        }
    }

    /// Number of rows; always 12
    pub fn n_rows(&self) -> usize {
        N_CHROMA
    }

    /// Number of time frames
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// All columns in time order
    pub fn frames(&self) -> &[[f32; N_CHROMA]] {
        &self.frames
    }

    /// Column `t`
    pub fn column(&self, t: usize) -> Option<&[f32; N_CHROMA]> {
        self.frames.get(t)
    }

    /// Row for one pitch class across time
    pub fn row(&self, pitch: PitchClass) -> Vec<f32> {
        self.frames.iter().map(|c| c[pitch.index()]).collect()
    }

    /// Hop size in samples between frames
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Sum over time: the aggregate pitch-class energy vector
    pub fn aggregate(&self) -> [f32; N_CHROMA] {
        let mut sum = [0.0f32; N_CHROMA];
        for column in &self.frames {
            for (acc, &v) in sum.iter_mut().zip(column) {
                *acc += v;
            }
        }
        sum
    }

    /// Mean over time (all zeros for an empty chromagram)
    pub fn mean(&self) -> [f32; N_CHROMA] {
        let mut mean = self.aggregate();
        if !self.frames.is_empty() {
            let n = self.frames.len() as f32;
            mean.iter_mut().for_each(|v| *v /= n);
        }
        mean
    }

    /// Row-major copy, `matrix[pitch][t]`, for plotting
    pub fn to_matrix(&self) -> Vec<Vec<f32>> {
        PitchClass::ALL.iter().map(|&pc| self.row(pc)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromagram_aggregate_and_mean() {
        let mut a = [0.0f32; 12];
        a[0] = 1.0;
        let mut b = [0.0f32; 12];
        b[0] = 0.5;
        b[7] = 1.0;
        let chroma = Chromagram::from_frames(vec![a, b], 512, 22050);

        let agg = chroma.aggregate();
        assert_eq!(agg[0], 1.5);
        assert_eq!(agg[7], 1.0);
        assert_eq!(chroma.mean()[0], 0.75);
        assert_eq!(chroma.row(PitchClass::G), vec![0.0, 1.0]);
    }

    #[test]
    fn test_chromagram_matrix_shape() {
        let chroma = Chromagram::from_frames(vec![[0.1; 12]; 5], 512, 22050);
        let matrix = chroma.to_matrix();
        assert_eq!(matrix.len(), 12);
        assert!(matrix.iter().all(|row| row.len() == 5));
        assert_eq!(chroma.n_rows(), 12);
    }

    #[test]
    fn test_empty_chromagram_mean_is_zero() {
        let chroma = Chromagram::from_frames(vec![], 512, 22050);
        assert_eq!(chroma.mean(), [0.0; 12]);
        assert!(chroma.column(0).is_none());
    }
}
