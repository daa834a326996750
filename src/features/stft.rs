//! Short-time Fourier transform
//!
//! Computed once per run and shared by the onset envelope and the chroma extractor,
//! so both sit on the same frame grid.
//!
//! Frames are centred: frame `t` covers samples `[t*hop - frame/2, t*hop + frame/2)`,
//! with zeros outside the signal. A signal of `n > 0` samples yields `1 + n / hop`
//! frames. Each frame is Hann-windowed before the FFT.

use crate::error::AnalysisError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Magnitude spectrogram, one spectrum per frame
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// `frames[t][k]` is the magnitude of bin `k` in frame `t`
    pub frames: Vec<Vec<f32>>,
    /// FFT length
    pub frame_size: usize,
    /// Hop between frames in samples
    pub hop_size: usize,
    /// Sample rate of the analysed signal
    pub sample_rate: u32,
}

impl Spectrogram {
    /// Number of frames
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of frequency bins per frame (`frame_size / 2 + 1`)
    pub fn n_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Centre frequency of bin `k` in Hz
    pub fn bin_frequency(&self, k: usize) -> f32 {
        k as f32 * self.sample_rate as f32 / self.frame_size as f32
    }
}

/// Periodic Hann window
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos()
        })
        .collect()
}

/// Compute the magnitude STFT of a mono signal
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - FFT length (e.g. 2048)
/// * `hop_size` - Hop size in samples (e.g. 512)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero sample rate, frame size or hop size
pub fn compute_stft(
    samples: &[f32],
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
) -> Result<Spectrogram, AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }
    if frame_size == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Frame size and hop size must be > 0 (frame={}, hop={})",
            frame_size, hop_size
        )));
    }

    let n_frames = if samples.is_empty() {
        0
    } else {
        1 + samples.len() / hop_size
    };

    log::debug!(
        "Computing STFT: {} samples, frame={}, hop={}, {} frames",
        samples.len(),
        frame_size,
        hop_size,
        n_frames
    );

    let window = hann_window(frame_size);
    let n_bins = frame_size / 2 + 1;
    let half = (frame_size / 2) as isize;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(frame_size);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); frame_size];

    let mut frames = Vec::with_capacity(n_frames);
    for t in 0..n_frames {
        let start = (t * hop_size) as isize - half;
        for (i, slot) in buffer.iter_mut().enumerate() {
            let idx = start + i as isize;
            let x = if idx >= 0 && (idx as usize) < samples.len() {
                samples[idx as usize]
            } else {
                0.0
            };
            *slot = Complex::new(x * window[i], 0.0);
        }

        fft.process(&mut buffer);
        frames.push(buffer[..n_bins].iter().map(|c| c.norm()).collect());
    }

    Ok(Spectrogram {
        frames,
        frame_size,
        hop_size,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stft_frame_count() {
        let samples = vec![0.0f32; 22050];
        let spec = compute_stft(&samples, 22050, 2048, 512).unwrap();
        assert_eq!(spec.n_frames(), 1 + 22050 / 512);
        assert_eq!(spec.frames[0].len(), 1025);
    }

    #[test]
    fn test_stft_empty_signal() {
        let spec = compute_stft(&[], 22050, 2048, 512).unwrap();
        assert_eq!(spec.n_frames(), 0);
    }

    #[test]
    fn test_stft_sine_peak_bin() {
        let sr = 22050;
        let freq = 1000.0;
        let samples: Vec<f32> = (0..sr)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sr as f32).sin())
            .collect();
        let spec = compute_stft(&samples, sr as u32, 2048, 512).unwrap();

        let frame = &spec.frames[spec.n_frames() / 2];
        let peak_bin = frame
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |best, (k, &m)| if m > best.1 { (k, m) } else { best })
            .0;
        assert!(
            (spec.bin_frequency(peak_bin) - freq).abs() < spec.bin_frequency(1),
            "Peak at {:.1} Hz",
            spec.bin_frequency(peak_bin)
        );
    }

    #[test]
    fn test_stft_invalid_params() {
        assert!(compute_stft(&[0.0; 100], 0, 2048, 512).is_err());
        assert!(compute_stft(&[0.0; 100], 22050, 0, 512).is_err());
        assert!(compute_stft(&[0.0; 100], 22050, 2048, 0).is_err());
    }
}
