//! Time signature detection
//!
//! Estimates beats per bar from the accent pattern of the tracked beats. Supports the
//! simple meters 2/4, 3/4 and 4/4.
//!
//! This is a heuristic with no ground-truth validation: treat the result as a hint,
//! not an authoritative meter.
//!
//! # Algorithm
//!
//! 1. Fewer than 2 beat intervals: meter is unknown
//! 2. Score each beat by the mean onset strength within ±`accent_window` frames
//! 3. Fewer than `min_scored_beats` scores: fall back to 4/4, flagged as a default
//! 4. For each candidate meter `m` in 2, 3, 4: split beats by `index % m`, and take the
//!    mean strength at offset 0 (downbeats) minus the mean strength at other offsets
//! 5. The largest gap wins; a later candidate must be strictly greater to replace an
//!    earlier one, so ties go to the smaller meter
//!
//! # Example
//!
//! ```
//! use cadence_dsp::features::beat_tracking::time_signature::score_meters;
//!
//! // Strong-weak-weak accents
//! let strengths = [1.0, 0.2, 0.2, 1.0, 0.2, 0.2, 1.0, 0.2, 0.2];
//! let gaps = score_meters(&strengths);
//! assert!(gaps[1] > gaps[0] && gaps[1] > gaps[2]);
//! ```

use super::BeatTrack;
use crate::analysis::result::InsufficientData;
use crate::features::onset::OnsetEnvelope;
use serde::Serialize;
use std::fmt;

/// Beats per bar, quarter-note denominator implied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Meter {
    /// 2/4
    Duple,
    /// 3/4
    Triple,
    /// 4/4
    Quadruple,
}

impl Meter {
    /// Candidates in the order they are tested
    pub const CANDIDATES: [Meter; 3] = [Meter::Duple, Meter::Triple, Meter::Quadruple];

    /// Get beats per bar for this meter
    pub fn beats_per_bar(&self) -> usize {
        match self {
            Meter::Duple => 2,
            Meter::Triple => 3,
            Meter::Quadruple => 4,
        }
    }

    /// Get name as string (e.g., "4/4", "3/4")
    pub fn name(&self) -> &'static str {
        match self {
            Meter::Duple => "2/4",
            Meter::Triple => "3/4",
            Meter::Quadruple => "4/4",
        }
    }
}

/// Meter used when too few beats could be scored
pub const DEFAULT_METER: Meter = Meter::Quadruple;

/// Result of time-signature estimation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TimeSignatureEstimate {
    /// Meter chosen by accent scoring
    Measured {
        /// Winning meter
        meter: Meter,
        /// Downbeat-minus-other-beat strength for 2, 3 and 4 beats per bar
        accent_gaps: [f32; 3],
    },
    /// Fallback meter, not measured
    Defaulted {
        /// Fallback meter (always 4/4)
        meter: Meter,
        /// Why scoring was skipped
        reason: InsufficientData,
    },
    /// Not enough beats to say anything
    Unknown(InsufficientData),
}

impl TimeSignatureEstimate {
    /// Reported meter, measured or defaulted; `None` when unknown
    pub fn meter(&self) -> Option<Meter> {
        match self {
            TimeSignatureEstimate::Measured { meter, .. }
            | TimeSignatureEstimate::Defaulted { meter, .. } => Some(*meter),
            TimeSignatureEstimate::Unknown(_) => None,
        }
    }

    /// True only when the meter came from accent scoring
    pub fn is_measured(&self) -> bool {
        matches!(self, TimeSignatureEstimate::Measured { .. })
    }

    /// "<m>/4", or "unknown"
    pub fn label(&self) -> &'static str {
        self.meter().map_or("unknown", |m| m.name())
    }
}

impl fmt::Display for TimeSignatureEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSignatureEstimate::Measured { meter, .. } => f.write_str(meter.name()),
            TimeSignatureEstimate::Defaulted { meter, reason } => {
                write!(f, "{} (default: {})", meter.name(), reason)
            }
            TimeSignatureEstimate::Unknown(reason) => write!(f, "unknown ({})", reason),
        }
    }
}

/// Estimate the time signature from tracked beats and the onset envelope
///
/// # Arguments
///
/// * `beats` - Beat frames, on the same grid as `envelope`
/// * `envelope` - Onset strength per frame
/// * `accent_window` - Half-width in frames of the averaging window around each beat
/// * `min_scored_beats` - Below this many scored beats (never less than 2), fall back to [`DEFAULT_METER`]
pub fn estimate_time_signature(
    beats: &BeatTrack,
    envelope: &OnsetEnvelope,
    accent_window: usize,
    min_scored_beats: usize,
) -> TimeSignatureEstimate {
    if beats.interval_count() < 2 {
        log::warn!(
            "Only {} beat intervals, time signature unknown",
            beats.interval_count()
        );
        return TimeSignatureEstimate::Unknown(InsufficientData::TooFewBeatIntervals);
    }

    // Every meter needs a downbeat and at least one other beat
    let min_scored_beats = min_scored_beats.max(2);
    let strengths = beat_strengths(&beats.frames, &envelope.values, accent_window);
    if strengths.len() < min_scored_beats {
        log::warn!(
            "Only {} scored beats (need {}), defaulting to {}",
            strengths.len(),
            min_scored_beats,
            DEFAULT_METER.name()
        );
        return TimeSignatureEstimate::Defaulted {
            meter: DEFAULT_METER,
            reason: InsufficientData::TooFewScoredBeats,
        };
    }

    let accent_gaps = score_meters(&strengths);

    let mut best = 0;
    for (i, &gap) in accent_gaps.iter().enumerate().skip(1) {
        if gap > accent_gaps[best] {
            best = i;
        }
    }
    let meter = Meter::CANDIDATES[best];

    log::debug!(
        "Time signature {} from {} beats (accent gaps 2/4={:.3}, 3/4={:.3}, 4/4={:.3})",
        meter.name(),
        strengths.len(),
        accent_gaps[0],
        accent_gaps[1],
        accent_gaps[2]
    );

    TimeSignatureEstimate::Measured { meter, accent_gaps }
}

/// Mean onset strength within ±`window` frames of each beat
///
/// Beats outside the envelope are not scored. The window is clipped at the envelope edges.
pub fn beat_strengths(beat_frames: &[usize], envelope: &[f32], window: usize) -> Vec<f32> {
    beat_frames
        .iter()
        .filter(|&&f| f < envelope.len())
        .map(|&f| {
            let lo = f.saturating_sub(window);
            let hi = f.saturating_add(window).min(envelope.len() - 1);
            let span = &envelope[lo..=hi];
            span.iter().sum::<f32>() / span.len() as f32
        })
        .collect()
}

/// Downbeat-minus-other-beat mean strength for 2, 3 and 4 beats per bar
///
/// A meter with no beats at offset 0 or none elsewhere scores `f32::NEG_INFINITY`.
pub fn score_meters(strengths: &[f32]) -> [f32; 3] {
    let mut gaps = [f32::NEG_INFINITY; 3];

    for (slot, meter) in gaps.iter_mut().zip(Meter::CANDIDATES) {
        let m = meter.beats_per_bar();
        let (mut down_sum, mut down_n) = (0.0f32, 0usize);
        let (mut other_sum, mut other_n) = (0.0f32, 0usize);

        for (i, &s) in strengths.iter().enumerate() {
            if i % m == 0 {
                down_sum += s;
                down_n += 1;
            } else {
                other_sum += s;
                other_n += 1;
            }
        }

        if down_n > 0 && other_n > 0 {
            let gap = down_sum / down_n as f32 - other_sum / other_n as f32;
            if gap.is_finite() {
                *slot = gap;
            }
        }
    }

    gaps
}
