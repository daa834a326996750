//! Key detection modules
//!
//! Detect musical key using:
//! - Binary or Krumhansl-Kessler key profiles (24 keys)
//! - Pearson correlation template matching

pub mod detector;
pub mod templates;

pub use detector::{estimate_key, estimate_key_from_distribution};
pub use templates::{KeyProfile, KeyTemplates};

use crate::analysis::result::{InsufficientData, Key};
use serde::Serialize;

/// Number of candidate keys (12 tonics × 2 modes)
pub const N_KEYS: usize = 24;

/// Key detection result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyDetectionResult {
    /// Detected key (best match)
    pub key: Key,

    /// Pearson correlation of the best match (-1.0 to 1.0)
    pub correlation: f32,

    /// All 24 correlations in interleaved order `[C, Cm, C#, C#m, ...]`
    pub scores: [f32; N_KEYS],

    /// Top keys with scores, best first
    /// Useful for ambiguous cases such as relative major/minor pairs
    pub top_keys: Vec<(Key, f32)>,
}

/// Outcome of key estimation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum KeyEstimate {
    /// A key was matched
    Detected(KeyDetectionResult),
    /// No meaningful key (silent or flat input)
    Unknown(InsufficientData),
}

impl KeyEstimate {
    /// Detected key, if any
    pub fn key(&self) -> Option<Key> {
        match self {
            KeyEstimate::Detected(result) => Some(result.key),
            KeyEstimate::Unknown(_) => None,
        }
    }

    /// "C major", "F# minor", or "unknown key"
    pub fn label(&self) -> String {
        self.key()
            .map_or_else(|| "unknown key".to_string(), |k| k.to_string())
    }
}
