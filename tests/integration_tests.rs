//! Integration tests for the analysis pipeline
//!
//! Fixtures are synthesised and written as WAV files into a temporary directory.

use cadence_dsp::{
    analyze_waveform, run_analysis, run_analysis_with_config, AnalysisConfig, AnalysisError,
    AnalysisFlag, AnalysisResult, EstimateStatus, LoadError, PitchClass, WaveformBuffer,
};
use std::f32::consts::PI;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write interleaved samples as a 16-bit PCM WAV file
fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV");
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(v).expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV");
}

fn fixture(dir: &TempDir, name: &str, samples: &[f32], sample_rate: u32) -> PathBuf {
    let path = dir.path().join(name);
    write_wav(&path, samples, sample_rate, 1);
    path
}

fn sine(freq: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let n = (seconds * sample_rate as f32) as usize;
    (0..n)
        .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Decaying 1 kHz bursts every `60 / bpm` seconds
fn click_track(bpm: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let n = (seconds * sample_rate as f32) as usize;
    let period = (60.0 / bpm * sample_rate as f32) as usize;
    let burst = sample_rate as usize / 20;
    (0..n)
        .map(|i| {
            let offset = i % period;
            if offset < burst {
                let t = offset as f32 / sample_rate as f32;
                0.8 * (-t * 80.0).exp() * (2.0 * PI * 1000.0 * t).sin()
            } else {
                0.0
            }
        })
        .collect()
}

fn argmax(v: &[f32; 12]) -> usize {
    let mut best = 0;
    for i in 1..12 {
        if v[i] > v[best] {
            best = i;
        }
    }
    best
}

#[test]
fn test_fixture_duration_and_chroma_rows() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "tone_2s.wav", &sine(440.0, 2.0, 22050), 22050);

    let result = run_analysis(&path).expect("Analysis should succeed");

    assert_eq!(result.sample_rate(), 22050);
    assert_eq!(result.samples().len(), 44100);
    assert_eq!(result.chromagram().n_rows(), 12);
    assert_eq!(result.chromagram().to_matrix().len(), 12);
    assert!((result.metadata().duration_seconds - 2.0).abs() < 1e-3);
    assert_eq!(result.waveform().source(), Some(path.as_path()));
}

#[test]
fn test_resampled_fixture_length() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "tone_44k.wav", &sine(440.0, 2.0, 44100), 44100);

    let result = run_analysis(&path).expect("Analysis should succeed");

    assert_eq!(result.sample_rate(), 22050);
    let expected = 2.0 * 22050.0;
    let len = result.samples().len() as f32;
    assert!(
        (len - expected).abs() / expected < 0.01,
        "Expected ~{} samples, got {}",
        expected,
        len
    );
}

#[test]
fn test_stereo_fixture_is_downmixed() {
    let dir = TempDir::new().unwrap();
    let mono = sine(440.0, 1.0, 22050);
    let interleaved: Vec<f32> = mono.iter().flat_map(|&s| [s, s]).collect();
    let path = dir.path().join("stereo.wav");
    write_wav(&path, &interleaved, 22050, 2);

    let result = run_analysis(&path).expect("Analysis should succeed");
    assert_eq!(result.samples().len(), 22050);
}

#[test]
fn test_click_track_tempo() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "click_120.wav", &click_track(120.0, 8.0, 22050), 22050);

    let result = run_analysis(&path).expect("Analysis should succeed");

    assert_eq!(result.tempo().status, EstimateStatus::Measured);
    assert!(
        (result.bpm() - 120.0).abs() < 5.0,
        "BPM should be close to 120, got {:.2}",
        result.bpm()
    );
    assert!(result.tempo().confidence > 0.0 && result.tempo().confidence <= 1.0);

    // ~0.5 s between beats
    let times = result.beats().times();
    assert!(times.len() >= 8, "Expected beats, got {:?}", times);
    let intervals: Vec<f32> = times.windows(2).map(|w| w[1] - w[0]).collect();
    let mean = intervals.iter().sum::<f32>() / intervals.len() as f32;
    assert!((mean - 0.5).abs() < 0.05, "Mean beat interval {:.3}", mean);

    assert!(result.time_signature().meter().is_some());
    assert!(!result.metadata().has_flag(AnalysisFlag::DefaultTempo));
}

#[test]
fn test_fast_click_track_not_halved() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "click_180.wav", &click_track(180.0, 10.0, 22050), 22050);

    let result = run_analysis(&path).expect("Analysis should succeed");

    assert_eq!(result.tempo().status, EstimateStatus::Measured);
    assert!(
        (result.bpm() - 180.0).abs() < 5.0,
        "BPM should be close to 180, got {:.2}",
        result.bpm()
    );
}

#[test]
fn test_sine_chroma_peaks_at_a() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "a440.wav", &sine(440.0, 3.0, 22050), 22050);

    let result = run_analysis(&path).expect("Analysis should succeed");

    let aggregate = result.chromagram().aggregate();
    assert_eq!(PitchClass::from_index(argmax(&aggregate)), PitchClass::A);
}

#[test]
fn test_c_major_chord_key() {
    // C4 E4 G4 plus D5 F4 A4 B4 at lower level: a C major scale with the triad emphasised
    let sr = 22050;
    let notes = [
        (261.63, 1.0),
        (329.63, 0.8),
        (392.00, 0.9),
        (293.66, 0.3),
        (349.23, 0.3),
        (440.00, 0.3),
        (493.88, 0.3),
    ];
    let n = 3 * sr as usize;
    let samples: Vec<f32> = (0..n)
        .map(|i| {
            let t = i as f32 / sr as f32;
            notes
                .iter()
                .map(|&(f, a)| a * (2.0 * PI * f * t).sin())
                .sum::<f32>()
                * 0.1
        })
        .collect();

    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "c_major.wav", &samples, sr);
    let result = run_analysis(&path).expect("Analysis should succeed");

    let key = result.key().key().expect("Key should be detected");
    // C major and A minor share a pitch set; either is a correct Krumhansl-Schmuckler answer
    assert!(
        key.name() == "C" || key.name() == "Am",
        "Expected C or Am, got {}",
        key.name()
    );
}

#[test]
fn test_nonexistent_path_is_load_error() {
    let result = run_analysis("definitely/not/here.wav");
    match result {
        Err(AnalysisError::Load(LoadError::NotFound(path))) => {
            assert_eq!(path, PathBuf::from("definitely/not/here.wav"));
        }
        other => panic!("Expected NotFound load error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_non_audio_file_is_load_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.wav");
    std::fs::write(&path, "this is not audio").unwrap();

    let err = run_analysis(&path).expect_err("Text file must not decode");
    assert!(err.as_load_error().is_some(), "Expected load error, got {}", err);
}

#[test]
fn test_sub_threshold_tone_has_unknown_key() {
    // A440 at ~-66 dBFS RMS, below the -60 dB silence threshold
    let quiet: Vec<f32> = sine(440.0, 3.0, 22050).iter().map(|s| s * 0.0014).collect();
    let result = analyze_waveform(WaveformBuffer::new(quiet, 22050), &AnalysisConfig::default())
        .expect("Quiet input degrades, it does not fail");

    let meta = result.metadata();
    assert!(meta.has_flag(AnalysisFlag::SilentInput));
    assert!(meta.has_flag(AnalysisFlag::UnknownKey));
    assert_eq!(
        *result.key(),
        cadence_dsp::KeyEstimate::Unknown(cadence_dsp::InsufficientData::SilentInput)
    );
    assert_eq!(result.key().label(), "unknown key");
    assert!(!result.tempo().status.is_measured());
    // The chromagram itself is still reported
    assert_eq!(result.chromagram().n_rows(), 12);
}

#[test]
fn test_silent_fixture_degrades_gracefully() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "silence.wav", &vec![0.0; 22050 * 2], 22050);

    let result = run_analysis(&path).expect("Silence is not a load failure");

    assert_eq!(result.bpm(), 0.0);
    assert!(!result.tempo().status.is_measured());
    assert_eq!(result.key().label(), "unknown key");
    assert_eq!(result.time_signature().label(), "unknown");
    assert!(result.beats().is_empty());

    let meta = result.metadata();
    for flag in [
        AnalysisFlag::SilentInput,
        AnalysisFlag::DefaultTempo,
        AnalysisFlag::UnknownKey,
        AnalysisFlag::UnknownMeter,
    ] {
        assert!(meta.has_flag(flag), "Missing flag {:?}", flag);
    }
    assert!(!meta.warnings.is_empty());
    assert_eq!(result.chromagram().mean(), [0.0; 12]);
}

#[test]
fn test_empty_waveform_analysis() {
    let waveform = WaveformBuffer::new(vec![], 22050);
    let result = analyze_waveform(waveform, &AnalysisConfig::default())
        .expect("Empty input degrades, it does not fail");

    assert_eq!(result.chromagram().n_frames(), 0);
    assert_eq!(result.chromagram().n_rows(), 12);
    assert!(result.key().key().is_none());
    assert!(result.time_signature().meter().is_none());
}

#[test]
fn test_invalid_config_rejected_before_loading() {
    let config = AnalysisConfig {
        hop_size: 0,
        ..AnalysisConfig::default()
    };
    let err = run_analysis_with_config("definitely/not/here.wav", config).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidInput(_)));
}

#[test]
fn test_summary_lists_all_pitch_classes() {
    let waveform = WaveformBuffer::new(sine(440.0, 2.0, 22050), 22050);
    let result = analyze_waveform(waveform, &AnalysisConfig::default()).unwrap();
    let summary = result.summary();

    assert!(summary.contains("Key:"));
    assert!(summary.contains("Time signature:"));
    for pc in PitchClass::ALL {
        assert!(summary.contains(&format!("{:<3}:", pc.name())));
    }
}

#[test]
fn test_result_is_send_and_serializable() {
    fn assert_send<T: Send + Sync>() {}
    assert_send::<AnalysisResult>();

    let waveform = WaveformBuffer::new(sine(440.0, 1.0, 22050), 22050);
    let result = analyze_waveform(waveform, &AnalysisConfig::default()).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("chromagram").is_some());
    assert!(json.get("metadata").is_some());
}
