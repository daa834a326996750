//! Dynamic-programming beat tracker
//!
//! Chooses the beat sequence that maximises total onset strength at the beats while
//! keeping consecutive beats close to the target period.
//!
//! # Algorithm
//!
//! 1. Normalise the onset envelope by its standard deviation
//! 2. Local score: envelope smoothed with a Gaussian whose width follows the period
//! 3. Forward pass: `cumscore[t] = local[t] + max_p(cumscore[p] - tightness * ln((t-p)/period)²)`
//!    over predecessors `p` between half and twice a period back
//! 4. Start from the last strong local maximum of `cumscore` and follow back-links
//! 5. Trim weak beats at either end
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.

use super::BeatTrack;
use crate::error::AnalysisError;
use crate::features::onset::OnsetEnvelope;

const EPSILON: f32 = 1e-10;

/// Track beats through an onset envelope at a known tempo
///
/// # Arguments
///
/// * `envelope` - Onset strength per frame
/// * `bpm` - Tempo to track (non-positive BPM yields an empty track)
/// * `tightness` - Penalty weight for deviating from the period (e.g. 100.0)
///
/// # Returns
///
/// Beat frames in increasing order; empty for a flat envelope or unknown tempo
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a negative tightness or invalid frame rate
pub fn track_beats(
    envelope: &OnsetEnvelope,
    bpm: f32,
    tightness: f32,
) -> Result<BeatTrack, AnalysisError> {
    if tightness < 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Beat tightness must be >= 0, got {:.2}",
            tightness
        )));
    }
    if envelope.sample_rate == 0 || envelope.hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid frame rate: {} Hz / hop {}",
            envelope.sample_rate, envelope.hop_size
        )));
    }

    let empty = BeatTrack::empty(envelope.hop_size, envelope.sample_rate);
    if !bpm.is_finite() || bpm <= 0.0 || envelope.len() < 2 {
        return Ok(empty);
    }

    let period = 60.0 * envelope.frame_rate() / bpm;
    if period < 1.0 {
        log::warn!("Beat period {:.2} frames below one frame, no beats tracked", period);
        return Ok(empty);
    }

    log::debug!(
        "Tracking beats: {} frames, {:.1} BPM (period {:.2} frames), tightness {:.1}",
        envelope.len(),
        bpm,
        period,
        tightness
    );

    let std = std_dev(&envelope.values);
    if std <= EPSILON {
        log::debug!("Flat onset envelope, no beats tracked");
        return Ok(empty);
    }
    let normalized: Vec<f32> = envelope.values.iter().map(|&v| v / std).collect();

    let local = local_score(&normalized, period);
    let (cumscore, backlink) = forward_pass(&local, period, tightness);

    let Some(last) = last_beat(&cumscore) else {
        return Ok(empty);
    };

    let mut frames = vec![last];
    let mut cursor = last;
    while let Some(prev) = backlink[cursor] {
        frames.push(prev);
        cursor = prev;
    }
    frames.reverse();

    let frames = trim_weak_beats(frames, &local);

    log::debug!("Tracked {} beats", frames.len());

    Ok(BeatTrack {
        frames,
        hop_size: envelope.hop_size,
        sample_rate: envelope.sample_rate,
    })
}

/// Sample standard deviation (n - 1 denominator)
fn std_dev(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let var = values.iter().map(|&v| (v - mean) * (v - mean)).sum::<f32>()
        / (values.len() - 1) as f32;
    var.sqrt()
}

/// Envelope convolved with a Gaussian of width `period / 32` frames
fn local_score(envelope: &[f32], period: f32) -> Vec<f32> {
    let half = period.round() as isize;
    let kernel: Vec<f32> = (-half..=half)
        .map(|i| {
            let x = i as f32 * 32.0 / period;
            (-0.5 * x * x).exp()
        })
        .collect();

    let n = envelope.len() as isize;
    (0..n)
        .map(|t| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(k, &w)| {
                    let idx = t + k as isize - half;
                    (idx >= 0 && idx < n).then(|| w * envelope[idx as usize])
                })
                .sum()
        })
        .collect()
}

/// Cumulative score and best predecessor for every frame
fn forward_pass(local: &[f32], period: f32, tightness: f32) -> (Vec<f32>, Vec<Option<usize>>) {
    let n = local.len();
    let far = (2.0 * period).round() as usize;
    let near = ((period / 2.0).round() as usize).max(1);

    // Transition cost by distance back
    let penalty: Vec<f32> = (0..=far)
        .map(|d| {
            if d < near {
                f32::NEG_INFINITY
            } else {
                let r = (d as f32 / period).ln();
                -tightness * r * r
            }
        })
        .collect();

    let max_local = local.iter().copied().fold(0.0f32, f32::max);
    let start_threshold = 0.01 * max_local;

    let mut cumscore = vec![0.0f32; n];
    let mut backlink = vec![None; n];
    let mut seen_first_beat = false;

    for t in 0..n {
        let mut best_score = f32::NEG_INFINITY;
        let mut best_prev = None;

        for d in near..=far {
            // Predecessors before the signal start contribute only the transition cost
            let (score, prev) = if d <= t {
                (penalty[d] + cumscore[t - d], Some(t - d))
            } else {
                (penalty[d], None)
            };
            if score > best_score {
                best_score = score;
                best_prev = prev;
            }
        }

        cumscore[t] = local[t] + best_score;

        if !seen_first_beat && local[t] < start_threshold {
            backlink[t] = None;
        } else {
            backlink[t] = best_prev;
            seen_first_beat = true;
        }
    }

    (cumscore, backlink)
}

/// Last local maximum of `cumscore` reaching half the median local-maximum score
fn last_beat(cumscore: &[f32]) -> Option<usize> {
    let n = cumscore.len();
    let maxima: Vec<usize> = (1..n)
        .filter(|&t| cumscore[t] > cumscore[t - 1] && (t + 1 == n || cumscore[t] >= cumscore[t + 1]))
        .collect();

    if maxima.is_empty() {
        return None;
    }

    let mut scores: Vec<f32> = maxima.iter().map(|&t| cumscore[t]).collect();
    scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = scores[scores.len() / 2];

    maxima
        .iter()
        .rev()
        .copied()
        .find(|&t| cumscore[t] >= 0.5 * median)
}

/// Drop leading and trailing beats whose local score is under half the RMS beat score
fn trim_weak_beats(frames: Vec<usize>, local: &[f32]) -> Vec<usize> {
    if frames.is_empty() {
        return frames;
    }

    let strengths: Vec<f32> = frames.iter().map(|&f| local[f]).collect();
    let rms = (strengths.iter().map(|&s| s * s).sum::<f32>() / strengths.len() as f32).sqrt();
    let threshold = 0.5 * rms;

    let first = strengths.iter().position(|&s| s >= threshold);
    let last = strengths.iter().rposition(|&s| s >= threshold);

    match (first, last) {
        (Some(a), Some(b)) => frames[a..=b].to_vec(),
        _ => vec![],
    }
}
