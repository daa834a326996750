//! Autocorrelation-based BPM estimation
//!
//! Finds periodicity in the onset-strength envelope using FFT-accelerated autocorrelation.
//!
//! # Algorithm
//!
//! 1. Remove the mean from the onset envelope
//! 2. Compute autocorrelation using FFT acceleration: `ACF = IFFT(|FFT(signal)|²)`
//! 3. Sum each lag with its two neighbours, so a period that falls between two
//!    integer lags is not split across them
//! 4. Weight by a log-normal prior centred on `start_bpm` (suppresses octave errors)
//! 5. Pick local maxima inside the BPM range, refine each with parabolic interpolation
//! 6. If the unweighted ACF at half the winning lag is at least as strong, promote the
//!    double tempo (undoes the prior's pull on fast tempos)
//! 7. Convert lag to BPM: `BPM = 60 * frame_rate / lag`
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.

use super::{BpmCandidate, TempoEstimate};
use crate::analysis::result::InsufficientData;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::onset::OnsetEnvelope;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

const EPSILON: f32 = 1e-10;

/// Tempo search parameters
#[derive(Debug, Clone, Copy)]
pub struct TempoSearch {
    /// Minimum BPM to consider
    pub min_bpm: f32,
    /// Maximum BPM to consider
    pub max_bpm: f32,
    /// Centre of the tempo prior
    pub start_bpm: f32,
    /// Standard deviation of the prior in octaves
    pub prior_octaves: f32,
    /// Number of candidates to keep
    pub max_candidates: usize,
}

impl TempoSearch {
    /// Take the tempo fields from an analysis config
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            min_bpm: config.min_bpm,
            max_bpm: config.max_bpm,
            start_bpm: config.start_bpm,
            prior_octaves: config.tempo_prior_octaves,
            max_candidates: config.max_tempo_candidates,
        }
    }

    /// Log-normal prior weight for a tempo
    fn prior(&self, bpm: f32) -> f32 {
        let octaves = (bpm / self.start_bpm).log2() / self.prior_octaves;
        (-0.5 * octaves * octaves).exp()
    }
}

impl Default for TempoSearch {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// Estimate tempo from an onset-strength envelope
///
/// # Arguments
///
/// * `envelope` - Onset strength per frame
/// * `search` - BPM range, prior and candidate count
///
/// # Returns
///
/// A measured [`TempoEstimate`] with ranked candidates, or a defaulted one when the
/// envelope is empty, too short for the BPM range, or has no periodicity (e.g. silence).
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for an invalid BPM range or frame rate
pub fn estimate_tempo(
    envelope: &OnsetEnvelope,
    search: &TempoSearch,
) -> Result<TempoEstimate, AnalysisError> {
    log::debug!(
        "Estimating tempo from autocorrelation: {} frames, range=[{:.1}, {:.1}] BPM, prior at {:.1} BPM",
        envelope.len(),
        search.min_bpm,
        search.max_bpm,
        search.start_bpm
    );

    if search.min_bpm <= 0.0 || search.max_bpm <= search.min_bpm {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid BPM range: [{:.1}, {:.1}]",
            search.min_bpm, search.max_bpm
        )));
    }

    if envelope.sample_rate == 0 || envelope.hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid frame rate: {} Hz / hop {}",
            envelope.sample_rate, envelope.hop_size
        )));
    }

    if envelope.is_empty() {
        return Ok(TempoEstimate::defaulted(InsufficientData::EmptyWaveform));
    }

    // Step 1: Mean-removed envelope
    let mean = envelope.values.iter().sum::<f32>() / envelope.len() as f32;
    let centered: Vec<f32> = envelope.values.iter().map(|&v| v - mean).collect();

    // Step 2: Autocorrelation
    let acf = compute_autocorrelation_fft(&centered);
    let energy = acf.first().copied().unwrap_or(0.0);
    if energy <= EPSILON {
        log::warn!("Onset envelope carries no energy, tempo left at default");
        return Ok(TempoEstimate::defaulted(InsufficientData::NoPeriodicity));
    }

    // Step 3: Lag range. Neighbours of every lag must exist for smoothing and interpolation.
    let frame_rate = envelope.frame_rate();
    let lag_min = ((60.0 * frame_rate / search.max_bpm).ceil() as usize).max(2);
    let lag_max = ((60.0 * frame_rate / search.min_bpm).floor() as usize)
        .min(acf.len().saturating_sub(3));

    if lag_min >= lag_max {
        log::warn!(
            "Envelope of {} frames too short for BPM range [{:.1}, {:.1}]",
            envelope.len(),
            search.min_bpm,
            search.max_bpm
        );
        return Ok(TempoEstimate::defaulted(InsufficientData::SignalTooShort));
    }

    // Step 4: Neighbour-summed ACF weighted by the tempo prior
    let smoothed: Vec<f32> = (0..acf.len())
        .map(|lag| {
            if lag == 0 || lag + 1 >= acf.len() {
                0.0
            } else {
                acf[lag - 1] + acf[lag] + acf[lag + 1]
            }
        })
        .collect();

    let weighted: Vec<f32> = (0..acf.len())
        .map(|lag| {
            if lag == 0 {
                0.0
            } else {
                smoothed[lag] * search.prior(60.0 * frame_rate / lag as f32)
            }
        })
        .collect();

    // Step 5: Peaks in range, best first
    let mut peaks = find_peaks_in_range(&weighted, lag_min, lag_max);
    if peaks.is_empty() {
        log::warn!("No autocorrelation peak in BPM range, tempo left at default");
        return Ok(TempoEstimate::defaulted(InsufficientData::NoPeriodicity));
    }
    prefer_double_tempo(&mut peaks, &smoothed);

    let mut candidates = Vec::with_capacity(search.max_candidates);
    for (lag, _) in peaks {
        let refined_lag = lag as f32 + parabolic_offset(&smoothed, lag);
        if refined_lag <= EPSILON {
            continue;
        }
        let bpm = 60.0 * frame_rate / refined_lag;
        if bpm < search.min_bpm || bpm > search.max_bpm {
            continue;
        }

        let confidence = (smoothed[lag] / energy).clamp(0.0, 1.0);
        candidates.push(BpmCandidate { bpm, confidence });

        if candidates.len() == search.max_candidates {
            break;
        }
    }

    log::debug!(
        "Autocorrelation found {} BPM candidates, primary {:?}",
        candidates.len(),
        candidates.first().map(|c| c.bpm)
    );

    Ok(TempoEstimate::measured(candidates))
}

/// Compute autocorrelation using FFT acceleration
///
/// Uses the identity: ACF = IFFT(|FFT(signal)|²), zero-padded to avoid wrap-around.
/// Negative lags values are clamped to zero.
fn compute_autocorrelation_fft(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    if n == 0 {
        return vec![];
    }

    let fft_size = (2 * n).next_power_of_two();

    let mut buffer: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    for x in &mut buffer {
        *x = Complex::new(x.norm_sqr(), 0.0);
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut buffer);

    let scale = 1.0 / (fft_size as f32);
    buffer[..n].iter().map(|x| (x.re * scale).max(0.0)).collect()
}

/// Local maxima of `values` within `[lo, hi]`, sorted by value (highest first)
///
/// Ties keep the shorter lag first.
fn find_peaks_in_range(values: &[f32], lo: usize, hi: usize) -> Vec<(usize, f32)> {
    let mut peaks: Vec<(usize, f32)> = (lo..=hi)
        .filter(|&i| i > 0 && i + 1 < values.len())
        .filter(|&i| values[i] > EPSILON && values[i] > values[i - 1] && values[i] >= values[i + 1])
        .map(|i| (i, values[i]))
        .collect();

    peaks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    peaks
}

/// Move the half-lag peak to the front when the raw ACF supports it at least as well
///
/// The prior pulls fast tempos (above ~170 BPM) towards half speed. An impulse train
/// at period `P` has a slightly larger unweighted ACF at `P` than at `2P`, so when the
/// winner sits at lag `L` and a peak near `L / 2` is at least as strong before
/// weighting, the faster tempo is the true one.
fn prefer_double_tempo(peaks: &mut Vec<(usize, f32)>, smoothed: &[f32]) {
    let Some(&(top_lag, _)) = peaks.first() else {
        return;
    };

    let half = peaks
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, &(lag, _))| (2 * lag).abs_diff(top_lag) <= 2)
        .map(|(i, &(lag, _))| (i, lag));

    if let Some((idx, half_lag)) = half {
        if smoothed[half_lag] >= smoothed[top_lag] {
            log::debug!(
                "Preferring lag {} over {}: raw ACF {:.3} >= {:.3}",
                half_lag,
                top_lag,
                smoothed[half_lag],
                smoothed[top_lag]
            );
            let peak = peaks.remove(idx);
            peaks.insert(0, peak);
        }
    }
}

/// Sub-sample offset of a peak from a parabola through its neighbours, in [-0.5, 0.5]
fn parabolic_offset(values: &[f32], i: usize) -> f32 {
    if i == 0 || i + 1 >= values.len() {
        return 0.0;
    }
    let (left, centre, right) = (values[i - 1], values[i], values[i + 1]);
    let denom = left - 2.0 * centre + right;
    if denom.abs() <= EPSILON {
        return 0.0;
    }
    (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
}
