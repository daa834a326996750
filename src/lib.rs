//! # Cadence DSP
//!
//! Music-recording analysis: loads a file and estimates tempo, chromagram, key and
//! time signature in one synchronous pass.
//!
//! ## Features
//!
//! - **Loading**: Symphonia decoding (WAV, FLAC, OGG/Vorbis, optional MP3/AAC), mono downmix,
//!   windowed-sinc resampling to a fixed analysis rate
//! - **Tempo**: Spectral-flux onset envelope with prior-weighted FFT autocorrelation
//! - **Chroma**: 12-bin pitch-class energy folded from the STFT
//! - **Key**: Krumhansl-Schmuckler correlation against 24 key profiles
//! - **Time signature**: Beat-accent scoring of 2/4, 3/4 and 4/4 over a dynamic-programming beat track
//!
//! ## Quick Start
//!
//! ```no_run
//! use cadence_dsp::run_analysis;
//!
//! let result = run_analysis("song.wav")?;
//!
//! println!("BPM: {:.2}", result.bpm());
//! println!("Key: {}", result.key().label());
//! println!("Time signature: {}", result.time_signature());
//! # Ok::<(), cadence_dsp::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! File → Loader → STFT ─┬→ Onset envelope → Tempo → Beats → Time signature
//!                       └→ Chromagram → Key
//! ```
//!
//! A load failure aborts the run. Every later stage degrades to an explicit default or
//! "unknown" estimate instead of failing, and records why in the result metadata.
//!
//! The core is synchronous. Callers that want background work submit
//! [`run_analysis`] to their own worker pool.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

use std::path::Path;
use std::time::Instant;

// Re-export main types
pub use analysis::metadata::{AnalysisFlag, AnalysisMetadata};
pub use analysis::result::{
    AnalysisResult, EstimateStatus, InsufficientData, Key, Mode, PitchClass,
};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, LoadError};
pub use features::beat_tracking::{BeatTrack, Meter, TimeSignatureEstimate};
pub use features::chroma::Chromagram;
pub use features::key::{KeyEstimate, KeyProfile};
pub use features::period::{BpmCandidate, TempoEstimate};
pub use io::{load_waveform, WaveformBuffer};

use features::beat_tracking::{estimate_time_signature, track_beats};
use features::chroma::{extract_chroma, ChromaParams};
use features::key::{estimate_key, KeyTemplates};
use features::onset::onset_strength;
use features::period::{estimate_tempo, TempoSearch};
use features::stft::compute_stft;

/// Analyze a recording with the default configuration
///
/// # Errors
///
/// Returns `AnalysisError::Load` if the file cannot be opened or decoded; no partial
/// result is produced in that case.
pub fn run_analysis<P: AsRef<Path>>(path: P) -> Result<AnalysisResult, AnalysisError> {
    run_analysis_with_config(path, AnalysisConfig::default())
}

/// Analyze a recording
///
/// Runs loader, tempo, chroma, key and time signature in that order.
///
/// # Arguments
///
/// * `path` - Audio file to analyze
/// * `config` - Analysis configuration parameters
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for an invalid configuration, and
/// `AnalysisError::Load` if the file cannot be loaded.
///
/// # Example
///
/// ```no_run
/// use cadence_dsp::{run_analysis_with_config, AnalysisConfig, KeyProfile};
///
/// let config = AnalysisConfig {
///     key_profile: KeyProfile::KrumhanslKessler,
///     ..AnalysisConfig::default()
/// };
/// let result = run_analysis_with_config("song.flac", config)?;
/// print!("{}", result.summary());
/// # Ok::<(), cadence_dsp::AnalysisError>(())
/// ```
pub fn run_analysis_with_config<P: AsRef<Path>>(
    path: P,
    config: AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    config.validate()?;
    let waveform = load_waveform(path, config.target_sample_rate)?;
    analyze_waveform(waveform, &config)
}

/// Analyze an already loaded waveform
///
/// Takes ownership of the buffer; it is handed back inside the result.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for an invalid configuration or sample rate and
/// `AnalysisError::NumericalError` for NaN or infinite samples. Short, silent or
/// arrhythmic input is not an error: the affected estimates are defaulted and flagged.
///
/// # Example
///
/// ```
/// use cadence_dsp::{analyze_waveform, AnalysisConfig, AnalysisFlag, WaveformBuffer};
///
/// let waveform = WaveformBuffer::new(vec![0.0f32; 22050 * 2], 22050);
/// let result = analyze_waveform(waveform, &AnalysisConfig::default())?;
///
/// assert!(result.metadata().has_flag(AnalysisFlag::SilentInput));
/// assert_eq!(result.key().label(), "unknown key");
/// assert_eq!(result.chromagram().n_rows(), 12);
/// # Ok::<(), cadence_dsp::AnalysisError>(())
/// ```
pub fn analyze_waveform(
    waveform: WaveformBuffer,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let start_time = Instant::now();
    config.validate()?;

    let sample_rate = waveform.sample_rate();
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate".to_string(),
        ));
    }

    if let Some(pos) = waveform.samples().iter().position(|s| !s.is_finite()) {
        return Err(AnalysisError::NumericalError(format!(
            "Non-finite sample at index {}",
            pos
        )));
    }

    log::debug!(
        "Starting audio analysis: {} samples at {} Hz",
        waveform.len(),
        sample_rate
    );

    let mut metadata = AnalysisMetadata {
        duration_seconds: waveform.duration_seconds(),
        sample_rate,
        ..AnalysisMetadata::default()
    };

    let silent = !waveform.is_empty()
        && preprocessing::silence::is_silent(waveform.samples(), config.min_amplitude_db);
    if silent {
        log::warn!(
            "Input below {:.1} dB, estimates will be defaults",
            config.min_amplitude_db
        );
        metadata.flag(
            AnalysisFlag::SilentInput,
            format!("Input is silent (below {:.1} dB RMS)", config.min_amplitude_db),
        );
    }

    // Shared STFT for onset and chroma
    let spectrogram = compute_stft(
        waveform.samples(),
        sample_rate,
        config.frame_size,
        config.hop_size,
    )?;
    metadata.methods_used.push("stft_hann".to_string());

    // Tempo
    let envelope = onset_strength(&spectrogram);
    let tempo = if waveform.is_empty() {
        TempoEstimate::defaulted(InsufficientData::EmptyWaveform)
    } else if silent {
        TempoEstimate::defaulted(InsufficientData::SilentInput)
    } else {
        estimate_tempo(&envelope, &TempoSearch::from_config(config))?
    };
    metadata.methods_used.push("spectral_flux".to_string());
    metadata.methods_used.push("autocorrelation".to_string());
    if let EstimateStatus::Defaulted(reason) = tempo.status {
        metadata.flag(
            AnalysisFlag::DefaultTempo,
            format!("Tempo left at default {:.1} BPM: {}", tempo.bpm, reason),
        );
    }

    // Beats follow the measured tempo only
    let beats = match tempo.measured_bpm() {
        Some(bpm) => track_beats(&envelope, bpm, config.beat_tightness)?,
        None => BeatTrack::empty(config.hop_size, sample_rate),
    };
    metadata.methods_used.push("dynamic_programming_beats".to_string());

    // Chroma and key
    let chromagram = extract_chroma(&spectrogram, &ChromaParams::from_config(config))?;
    metadata.methods_used.push("chroma".to_string());
    if chromagram.n_frames() != envelope.len() {
        return Err(AnalysisError::ProcessingError(format!(
            "Chromagram has {} frames but onset envelope has {}",
            chromagram.n_frames(),
            envelope.len()
        )));
    }

    // Sub-threshold input would still normalise to full-scale chroma columns
    let key = if silent {
        KeyEstimate::Unknown(InsufficientData::SilentInput)
    } else {
        estimate_key(&chromagram, &KeyTemplates::new(config.key_profile))
    };
    metadata.methods_used.push(format!("key_{:?}", config.key_profile).to_lowercase());
    if let KeyEstimate::Unknown(reason) = &key {
        metadata.flag(AnalysisFlag::UnknownKey, format!("Key unknown: {}", reason));
    }

    // Time signature
    let time_signature = estimate_time_signature(
        &beats,
        &envelope,
        config.accent_window,
        config.min_scored_beats,
    );
    metadata.methods_used.push("beat_accent_meter".to_string());
    match time_signature {
        TimeSignatureEstimate::Defaulted { meter, reason } => metadata.flag(
            AnalysisFlag::DefaultMeter,
            format!("Time signature defaulted to {}: {}", meter.name(), reason),
        ),
        TimeSignatureEstimate::Unknown(reason) => metadata.flag(
            AnalysisFlag::UnknownMeter,
            format!("Time signature unknown: {}", reason),
        ),
        TimeSignatureEstimate::Measured { .. } => {}
    }

    metadata.processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    log::debug!(
        "Analysis complete: {:.1} BPM, {}, {}, {} beats in {:.1} ms",
        tempo.bpm,
        key.label(),
        time_signature.label(),
        beats.len(),
        metadata.processing_time_ms
    );

    Ok(AnalysisResult::new(
        waveform,
        tempo,
        beats,
        chromagram,
        key,
        time_signature,
        metadata,
    ))
}
