//! Feature extraction modules
//!
//! This module contains all feature extraction algorithms:
//! - Short-time Fourier transform (shared by onset and chroma)
//! - Onset strength (spectral flux)
//! - Period estimation (BPM detection)
//! - Beat tracking and time signature
//! - Chroma extraction
//! - Key detection

pub mod beat_tracking;
pub mod chroma;
pub mod key;
pub mod onset;
pub mod period;
pub mod stft;
