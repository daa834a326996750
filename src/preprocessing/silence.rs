//! Silence detection utilities

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Overall RMS level of a signal in dBFS
///
/// Empty or all-zero input returns `f32::NEG_INFINITY`.
pub fn rms_db(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return f32::NEG_INFINITY;
    }

    let sum_sq: f64 = samples.iter().map(|&x| (x as f64) * (x as f64)).sum();
    let rms = (sum_sq / samples.len() as f64).sqrt() as f32;

    if rms <= EPSILON {
        f32::NEG_INFINITY
    } else {
        20.0 * rms.log10()
    }
}

/// Whether a signal is too quiet to analyse
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `threshold_db` - RMS level in dBFS below which the signal counts as silent
pub fn is_silent(samples: &[f32], threshold_db: f32) -> bool {
    let level = rms_db(samples);
    log::debug!(
        "Signal level {:.1} dBFS (silence threshold {:.1} dBFS)",
        level,
        threshold_db
    );
    level < threshold_db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_detected() {
        assert!(is_silent(&vec![0.0f32; 22050], -60.0));
        assert!(is_silent(&[], -60.0));
    }

    #[test]
    fn test_full_scale_square_is_0_db() {
        let samples: Vec<f32> = (0..1000).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!(rms_db(&samples).abs() < 1e-3);
        assert!(!is_silent(&samples, -60.0));
    }

    #[test]
    fn test_quiet_signal_below_threshold() {
        // -80 dBFS constant
        let samples = vec![1e-4f32; 1000];
        assert!((rms_db(&samples) + 80.0).abs() < 0.01);
        assert!(is_silent(&samples, -60.0));
    }
}
