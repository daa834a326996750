//! Sample-rate conversion using Rubato

use crate::error::LoadError;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Sinc filter length; also the zero padding appended so the filter tail is flushed
const SINC_LEN: usize = 256;

/// Resample a mono signal
///
/// The whole signal is processed as one chunk. The filter delay is removed so that
/// sample `n` of the output lines up with time `n / to_rate` of the input, and the
/// output is trimmed to `round(len * to_rate / from_rate)` samples.
///
/// # Errors
///
/// Returns `LoadError::Resample` if either rate is zero or Rubato fails
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, LoadError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(LoadError::Resample(format!(
            "Invalid sample rates: {} -> {}",
            from_rate, to_rate
        )));
    }

    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    log::debug!(
        "Resampling {} samples: {} Hz -> {} Hz",
        samples.len(),
        from_rate,
        to_rate
    );

    let params = SincInterpolationParameters {
        sinc_len: SINC_LEN,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let mut padded = Vec::with_capacity(samples.len() + SINC_LEN);
    padded.extend_from_slice(samples);
    padded.resize(samples.len() + SINC_LEN, 0.0);

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, padded.len(), 1)
        .map_err(|e| LoadError::Resample(e.to_string()))?;
    let delay = resampler.output_delay();

    let waves_in = vec![padded];
    let mut waves_out = resampler
        .process(&waves_in, None)
        .map_err(|e| LoadError::Resample(e.to_string()))?;
    let out = waves_out.pop().unwrap_or_default();

    let expected = (samples.len() as f64 * ratio).round() as usize;
    let start = delay.min(out.len());
    let end = (delay + expected).min(out.len());

    Ok(out[start..end].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_same_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 22050, 22050).unwrap(), samples);
    }

    #[test]
    fn test_resample_zero_rate() {
        assert!(resample(&[0.0; 10], 0, 22050).is_err());
    }

    #[test]
    fn test_resample_halves_length() {
        let samples: Vec<f32> = (0..44100)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44100.0).sin() * 0.5)
            .collect();
        let out = resample(&samples, 44100, 22050).unwrap();

        assert!(
            (out.len() as i64 - 22050).abs() <= 2,
            "Expected ~22050 samples, got {}",
            out.len()
        );

        // Low tone passes through with its amplitude intact
        let peak = out[1000..21000].iter().fold(0.0f32, |m, &x| m.max(x.abs()));
        assert!(peak > 0.4 && peak < 0.6, "Peak amplitude {}", peak);
    }
}
