//! Analysis result types

use super::metadata::AnalysisMetadata;
use crate::features::beat_tracking::time_signature::TimeSignatureEstimate;
use crate::features::beat_tracking::BeatTrack;
use crate::features::chroma::Chromagram;
use crate::features::key::KeyEstimate;
use crate::features::period::TempoEstimate;
use crate::io::WaveformBuffer;
use serde::Serialize;
use std::fmt;

/// One of the twelve equal-tempered pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PitchClass {
    /// C
    C,
    /// C♯ / D♭
    CSharp,
    /// D
    D,
    /// D♯ / E♭
    DSharp,
    /// E
    E,
    /// F
    F,
    /// F♯ / G♭
    FSharp,
    /// G
    G,
    /// G♯ / A♭
    GSharp,
    /// A
    A,
    /// A♯ / B♭
    ASharp,
    /// B
    B,
}

impl PitchClass {
    /// All pitch classes in chromagram row order (C..B)
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Pitch class for a semitone index, wrapping modulo 12
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Semitone index above C (0..12)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Shift up by `semitones`, wrapping at the octave
    pub fn transpose(self, semitones: usize) -> Self {
        Self::from_index(self.index() + semitones)
    }

    /// Name in sharp notation (e.g. "C", "F#")
    pub fn name(self) -> &'static str {
        const NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        NAMES[self.index()]
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Major or minor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mode {
    /// Major (Ionian)
    Major,
    /// Natural minor (Aeolian)
    Minor,
}

/// Musical key: tonic plus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Key {
    /// Tonic pitch class
    pub tonic: PitchClass,
    /// Mode
    pub mode: Mode,
}

impl Key {
    /// Create a key
    pub fn new(tonic: PitchClass, mode: Mode) -> Self {
        Self { tonic, mode }
    }

    /// Get key name in musical notation (e.g., "C", "Am", "F#", "D#m")
    ///
    /// # Example
    ///
    /// ```
    /// use cadence_dsp::{Key, Mode, PitchClass};
    ///
    /// assert_eq!(Key::new(PitchClass::C, Mode::Major).name(), "C");
    /// assert_eq!(Key::new(PitchClass::A, Mode::Minor).name(), "Am");
    /// ```
    pub fn name(&self) -> String {
        match self.mode {
            Mode::Major => self.tonic.name().to_string(),
            Mode::Minor => format!("{}m", self.tonic.name()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            Mode::Major => "major",
            Mode::Minor => "minor",
        };
        write!(f, "{} {}", self.tonic, mode)
    }
}

/// Why an estimate could not be measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsufficientData {
    /// The waveform has no samples
    EmptyWaveform,
    /// The waveform is below the silence threshold
    SilentInput,
    /// Too few frames for the requested analysis range
    SignalTooShort,
    /// The onset envelope shows no periodicity in the tempo range
    NoPeriodicity,
    /// Fewer than two beat intervals were detected
    TooFewBeatIntervals,
    /// Fewer beats could be scored than the meter test needs
    TooFewScoredBeats,
    /// The pitch-class distribution is flat, so correlation is undefined
    ZeroVariance,
}

impl InsufficientData {
    /// Short explanation for logs and warnings
    pub fn describe(&self) -> &'static str {
        match self {
            InsufficientData::EmptyWaveform => "waveform is empty",
            InsufficientData::SilentInput => "waveform is silent",
            InsufficientData::SignalTooShort => "signal too short",
            InsufficientData::NoPeriodicity => "no periodicity in onset envelope",
            InsufficientData::TooFewBeatIntervals => "fewer than 2 beat intervals",
            InsufficientData::TooFewScoredBeats => "too few beats to score accents",
            InsufficientData::ZeroVariance => "pitch-class distribution has zero variance",
        }
    }
}

impl fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Whether a value was measured or is a documented fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EstimateStatus {
    /// Derived from the signal
    Measured,
    /// Fallback value, with the reason
    Defaulted(InsufficientData),
}

impl EstimateStatus {
    /// True for [`EstimateStatus::Measured`]
    pub fn is_measured(&self) -> bool {
        matches!(self, EstimateStatus::Measured)
    }
}

/// Complete analysis result
///
/// Built once by the orchestrator and read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    waveform: WaveformBuffer,
    tempo: TempoEstimate,
    beats: BeatTrack,
    chromagram: Chromagram,
    key: KeyEstimate,
    time_signature: TimeSignatureEstimate,
    metadata: AnalysisMetadata,
}

impl AnalysisResult {
    pub(crate) fn new(
        waveform: WaveformBuffer,
        tempo: TempoEstimate,
        beats: BeatTrack,
        chromagram: Chromagram,
        key: KeyEstimate,
        time_signature: TimeSignatureEstimate,
        metadata: AnalysisMetadata,
    ) -> Self {
        Self {
            waveform,
            tempo,
            beats,
            chromagram,
            key,
            time_signature,
            metadata,
        }
    }

    /// Primary BPM (the documented default when tempo was not measured)
    pub fn bpm(&self) -> f32 {
        self.tempo.bpm
    }

    /// Full tempo estimate with candidates and status
    pub fn tempo(&self) -> &TempoEstimate {
        &self.tempo
    }

    /// Detected beats
    pub fn beats(&self) -> &BeatTrack {
        &self.beats
    }

    /// 12 × N chromagram
    pub fn chromagram(&self) -> &Chromagram {
        &self.chromagram
    }

    /// Key estimate
    pub fn key(&self) -> &KeyEstimate {
        &self.key
    }

    /// Time-signature estimate
    pub fn time_signature(&self) -> &TimeSignatureEstimate {
        &self.time_signature
    }

    /// Analysed waveform
    pub fn waveform(&self) -> &WaveformBuffer {
        &self.waveform
    }

    /// Mono samples the analysis ran on
    pub fn samples(&self) -> &[f32] {
        self.waveform.samples()
    }

    /// Sample rate of [`samples`](Self::samples)
    pub fn sample_rate(&self) -> u32 {
        self.waveform.sample_rate()
    }

    /// Analysis metadata
    pub fn metadata(&self) -> &AnalysisMetadata {
        &self.metadata
    }

    /// Plain-text report: tempo, key, meter and mean chroma energy per pitch class
    pub fn summary(&self) -> String {
        let mut out = String::from("--- Analysis Results ---\n");

        match self.tempo.status {
            EstimateStatus::Measured => {
                out.push_str(&format!(
                    "Estimated BPM: {:.2} (confidence: {:.2})\n",
                    self.tempo.bpm, self.tempo.confidence
                ));
            }
            EstimateStatus::Defaulted(reason) => {
                out.push_str(&format!("Estimated BPM: unavailable ({})\n", reason));
            }
        }

        out.push_str(&format!("Key: {}\n", self.key.label()));
        out.push_str(&format!("Time signature: {}\n", self.time_signature));

        out.push_str("\nChromagram (average energy per pitch class):\n");
        let mean = self.chromagram.mean();
        for pc in PitchClass::ALL {
            out.push_str(&format!("{:<3}: {:.4}\n", pc.name(), mean[pc.index()]));
        }
        out.push_str("------------------------\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class_names() {
        assert_eq!(PitchClass::C.name(), "C");
        assert_eq!(PitchClass::CSharp.name(), "C#");
        assert_eq!(PitchClass::FSharp.name(), "F#");
        assert_eq!(PitchClass::B.name(), "B");
    }

    #[test]
    fn test_pitch_class_index_roundtrip() {
        for (i, pc) in PitchClass::ALL.iter().enumerate() {
            assert_eq!(pc.index(), i);
            assert_eq!(PitchClass::from_index(i), *pc);
        }
        assert_eq!(PitchClass::from_index(14), PitchClass::D);
    }

    #[test]
    fn test_pitch_class_transpose_wraps() {
        assert_eq!(PitchClass::A.transpose(3), PitchClass::C);
        assert_eq!(PitchClass::C.transpose(12), PitchClass::C);
    }

    #[test]
    fn test_key_name() {
        assert_eq!(Key::new(PitchClass::C, Mode::Major).name(), "C");
        assert_eq!(Key::new(PitchClass::FSharp, Mode::Major).name(), "F#");
        assert_eq!(Key::new(PitchClass::A, Mode::Minor).name(), "Am");
        assert_eq!(Key::new(PitchClass::CSharp, Mode::Minor).name(), "C#m");
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::new(PitchClass::D, Mode::Minor).to_string(), "D minor");
        assert_eq!(Key::new(PitchClass::GSharp, Mode::Major).to_string(), "G# major");
    }

    #[test]
    fn test_estimate_status() {
        assert!(EstimateStatus::Measured.is_measured());
        assert!(!EstimateStatus::Defaulted(InsufficientData::SilentInput).is_measured());
    }
}
