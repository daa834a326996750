//! Channel mixing utilities (multi-channel to mono conversion)

use crate::error::AnalysisError;

/// Average interleaved frames down to one channel
///
/// # Arguments
///
/// * `interleaved` - Samples laid out as `[c0, c1, ..., c0, c1, ...]`
/// * `channels` - Number of channels per frame
///
/// # Returns
///
/// Mono samples, one per frame. A trailing partial frame is dropped.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `channels` is zero
pub fn downmix_interleaved(interleaved: &[f32], channels: usize) -> Result<Vec<f32>, AnalysisError> {
    if channels == 0 {
        return Err(AnalysisError::InvalidInput(
            "Channel count must be > 0".to_string(),
        ));
    }

    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    let scale = 1.0 / channels as f32;
    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo() {
        let interleaved = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mono = downmix_interleaved(&interleaved, 2).unwrap();
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let samples = [0.1, -0.2, 0.3];
        assert_eq!(downmix_interleaved(&samples, 1).unwrap(), samples.to_vec());
    }

    #[test]
    fn test_downmix_drops_partial_frame() {
        let interleaved = [0.3, 0.3, 0.3, 0.9, 0.9, 0.9, 0.5];
        let mono = downmix_interleaved(&interleaved, 3).unwrap();
        assert_eq!(mono.len(), 2);
        assert!((mono[1] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_downmix_zero_channels() {
        assert!(downmix_interleaved(&[0.0; 4], 0).is_err());
    }
}
