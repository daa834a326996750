//! Audio I/O modules
//!
//! Decoding with Symphonia, resampling with Rubato, and the immutable
//! [`WaveformBuffer`](sample_buffer::WaveformBuffer) every later stage reads from.

pub mod decoder;
pub mod resample;
pub mod sample_buffer;

pub use sample_buffer::{load_waveform, WaveformBuffer};
