//! Configuration parameters for audio analysis

use crate::error::AnalysisError;
use crate::features::key::templates::KeyProfile;

/// Analysis configuration parameters
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // Loading
    /// Sample rate every recording is resampled to (default: 22050)
    pub target_sample_rate: u32,

    /// Silence threshold in dB (default: -60.0)
    /// Recordings whose overall RMS is below this are reported as silent
    pub min_amplitude_db: f32,

    // STFT parameters
    /// Frame size for STFT (default: 2048)
    pub frame_size: usize,

    /// Hop size for STFT (default: 512)
    /// Chromagram, onset envelope and beat track all share this time base
    pub hop_size: usize,

    // BPM detection
    /// Minimum BPM to consider (default: 40.0)
    pub min_bpm: f32,

    /// Maximum BPM to consider (default: 220.0)
    pub max_bpm: f32,

    /// Centre of the log-normal tempo prior (default: 120.0)
    pub start_bpm: f32,

    /// Width of the tempo prior in octaves (default: 1.0)
    pub tempo_prior_octaves: f32,

    /// Number of ranked tempo candidates kept (default: 5)
    pub max_tempo_candidates: usize,

    // Beat tracking
    /// How strongly the beat tracker sticks to the estimated period (default: 100.0)
    pub beat_tightness: f32,

    // Key detection
    /// Center frequency for chroma extraction (default: 440.0 Hz, A4)
    pub center_frequency: f32,

    /// Lowest frequency folded into chroma (default: 32.7 Hz, C1)
    pub chroma_min_frequency: f32,

    /// Highest frequency folded into chroma (default: 5000.0 Hz)
    pub chroma_max_frequency: f32,

    /// Enable soft chroma mapping (default: false)
    /// Soft mapping spreads frequency bins to neighboring semitones
    pub soft_chroma_mapping: bool,

    /// Soft mapping standard deviation in semitones (default: 0.5)
    pub soft_mapping_sigma: f32,

    /// Chroma sharpening power (default: 1.0 = no sharpening)
    pub chroma_sharpening_power: f32,

    /// Reference key profiles (default: binary diatonic)
    pub key_profile: KeyProfile,

    // Time signature
    /// Half-width in frames of the window averaged around each beat (default: 2)
    pub accent_window: usize,

    /// Fewer scored beats than this falls back to 4/4 (default: 4)
    pub min_scored_beats: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 22050,
            min_amplitude_db: -60.0,
            frame_size: 2048,
            hop_size: 512,
            min_bpm: 40.0,
            max_bpm: 220.0,
            start_bpm: 120.0,
            tempo_prior_octaves: 1.0,
            max_tempo_candidates: 5,
            beat_tightness: 100.0,
            center_frequency: 440.0,
            chroma_min_frequency: 32.7,
            chroma_max_frequency: 5000.0,
            soft_chroma_mapping: false,
            soft_mapping_sigma: 0.5,
            chroma_sharpening_power: 1.0,
            key_profile: KeyProfile::Binary,
            accent_window: 2,
            min_scored_beats: 4,
        }
    }
}

impl AnalysisConfig {
    /// Check that the parameters describe a runnable pipeline
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let floats = [
            ("min_amplitude_db", self.min_amplitude_db),
            ("min_bpm", self.min_bpm),
            ("max_bpm", self.max_bpm),
            ("start_bpm", self.start_bpm),
            ("tempo_prior_octaves", self.tempo_prior_octaves),
            ("beat_tightness", self.beat_tightness),
            ("center_frequency", self.center_frequency),
            ("chroma_min_frequency", self.chroma_min_frequency),
            ("chroma_max_frequency", self.chroma_max_frequency),
            ("soft_mapping_sigma", self.soft_mapping_sigma),
            ("chroma_sharpening_power", self.chroma_sharpening_power),
        ];
        if let Some((name, value)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AnalysisError::InvalidInput(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }

        if self.target_sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "target_sample_rate must be > 0".to_string(),
            ));
        }
        if self.frame_size < 2 {
            return Err(AnalysisError::InvalidInput(format!(
                "frame_size must be >= 2, got {}",
                self.frame_size
            )));
        }
        if self.hop_size == 0 {
            return Err(AnalysisError::InvalidInput(
                "hop_size must be > 0".to_string(),
            ));
        }
        if self.min_bpm <= 0.0 || self.max_bpm <= self.min_bpm {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid BPM range: [{:.1}, {:.1}]",
                self.min_bpm, self.max_bpm
            )));
        }
        if self.start_bpm <= 0.0 || self.tempo_prior_octaves <= 0.0 {
            return Err(AnalysisError::InvalidInput(
                "start_bpm and tempo_prior_octaves must be > 0".to_string(),
            ));
        }
        if self.max_tempo_candidates == 0 {
            return Err(AnalysisError::InvalidInput(
                "max_tempo_candidates must be > 0".to_string(),
            ));
        }
        if self.beat_tightness < 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "beat_tightness must be >= 0, got {:.2}",
                self.beat_tightness
            )));
        }
        if self.center_frequency <= 0.0
            || self.chroma_min_frequency <= 0.0
            || self.chroma_max_frequency <= self.chroma_min_frequency
        {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid chroma band: [{:.1}, {:.1}] Hz around {:.1} Hz",
                self.chroma_min_frequency, self.chroma_max_frequency, self.center_frequency
            )));
        }
        if self.soft_chroma_mapping && self.soft_mapping_sigma <= 0.0 {
            return Err(AnalysisError::InvalidInput(
                "soft_mapping_sigma must be > 0".to_string(),
            ));
        }
        if self.chroma_sharpening_power <= 0.0 {
            return Err(AnalysisError::InvalidInput(
                "chroma_sharpening_power must be > 0".to_string(),
            ));
        }
        // Meter scoring needs a downbeat and at least one other beat
        if self.min_scored_beats < 2 {
            return Err(AnalysisError::InvalidInput(format!(
                "min_scored_beats must be >= 2, got {}",
                self.min_scored_beats
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let config = AnalysisConfig {
            hop_size: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            min_bpm: 180.0,
            max_bpm: 60.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            target_sample_rate: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        let config = AnalysisConfig {
            start_bpm: f32::NAN,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidInput(_))));

        let config = AnalysisConfig {
            chroma_max_frequency: f32::INFINITY,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            beat_tightness: f32::NAN,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_tightness_rejected() {
        let config = AnalysisConfig {
            beat_tightness: -1.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            beat_tightness: 0.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_min_scored_beats_below_two_rejected() {
        for min_scored_beats in [0, 1] {
            let config = AnalysisConfig {
                min_scored_beats,
                ..AnalysisConfig::default()
            };
            assert!(config.validate().is_err(), "min_scored_beats={}", min_scored_beats);
        }
    }

    #[test]
    fn test_huge_accent_window_is_accepted() {
        // The window is clipped to the envelope, so any width is usable
        let config = AnalysisConfig {
            accent_window: usize::MAX,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
