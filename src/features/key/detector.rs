//! Key detection algorithm
//!
//! Correlates the aggregate pitch-class distribution of a chromagram against 24 key
//! templates (Krumhansl-Schmuckler key finding).
//!
//! Scores are kept in interleaved order `[C, Cm, C#, C#m, ..., B, Bm]`. The best score
//! wins; on a tie the earlier index wins, so the tonic is `index / 2` and even indices
//! are major.
//!
//! # Reference
//!
//! Krumhansl, C. L. (1990). *Cognitive Foundations of Musical Pitch*. Oxford University Press.

use super::templates::KeyTemplates;
use super::{KeyDetectionResult, KeyEstimate, N_KEYS};
use crate::analysis::result::{InsufficientData, Key, Mode, PitchClass};
use crate::features::chroma::Chromagram;

/// Variance below this is treated as zero
const EPSILON: f32 = 1e-12;

/// Number of ranked keys kept in [`KeyDetectionResult::top_keys`]
const TOP_N: usize = 3;

/// Estimate the key of a chromagram
///
/// Sums the chromagram over time, then matches the 12-element distribution against
/// every template. Returns [`KeyEstimate::Unknown`] for an empty chromagram or a flat
/// distribution, never a NaN-driven guess.
///
/// # Example
///
/// ```
/// use cadence_dsp::features::chroma::Chromagram;
/// use cadence_dsp::features::key::{detector::estimate_key, templates::KeyTemplates};
///
/// // C major scale with the triad emphasised
/// let column = [1.0, 0.0, 0.3, 0.0, 0.8, 0.3, 0.0, 0.9, 0.0, 0.3, 0.0, 0.3];
/// let chroma = Chromagram::from_frames(vec![column; 10], 512, 22050);
///
/// let estimate = estimate_key(&chroma, &KeyTemplates::default());
/// assert_eq!(estimate.label(), "C major");
/// ```
pub fn estimate_key(chromagram: &Chromagram, templates: &KeyTemplates) -> KeyEstimate {
    log::debug!(
        "Estimating key from {} chroma frames",
        chromagram.n_frames()
    );

    if chromagram.n_frames() == 0 {
        log::warn!("Empty chromagram, key unknown");
        return KeyEstimate::Unknown(InsufficientData::EmptyWaveform);
    }

    estimate_key_from_distribution(&chromagram.aggregate(), templates)
}

/// Match a 12-element pitch-class distribution against the key templates
pub fn estimate_key_from_distribution(
    distribution: &[f32; 12],
    templates: &KeyTemplates,
) -> KeyEstimate {
    let Some(scores) = correlate(distribution, templates) else {
        log::warn!("Pitch-class distribution has zero variance, key unknown");
        return KeyEstimate::Unknown(InsufficientData::ZeroVariance);
    };

    let best = argmax_first(&scores);
    let key = key_at(best);

    let mut ranked: Vec<(Key, f32)> = scores
        .iter()
        .enumerate()
        .map(|(idx, &score)| (key_at(idx), score))
        .collect();
    // Stable sort keeps interleaved order among equal scores
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(TOP_N);

    log::debug!(
        "Detected key {} (r={:.3}); runners-up: {:?}",
        key.name(),
        scores[best],
        ranked
            .iter()
            .skip(1)
            .map(|(k, s)| format!("{} {:.3}", k.name(), s))
            .collect::<Vec<_>>()
    );

    KeyEstimate::Detected(KeyDetectionResult {
        key,
        correlation: scores[best],
        scores,
        top_keys: ranked,
    })
}

/// Pearson correlation of `distribution` with all 24 templates, interleaved
///
/// Returns `None` when the distribution has zero variance.
pub fn correlate(distribution: &[f32; 12], templates: &KeyTemplates) -> Option<[f32; N_KEYS]> {
    let mut scores = [0.0f32; N_KEYS];
    for tonic in 0..12 {
        scores[2 * tonic] = pearson(distribution, templates.get_major_template(tonic))?;
        scores[2 * tonic + 1] = pearson(distribution, templates.get_minor_template(tonic))?;
    }
    Some(scores)
}

/// Pearson correlation coefficient; `None` if either input has zero variance
pub fn pearson(a: &[f32; 12], b: &[f32; 12]) -> Option<f32> {
    let mean_a = a.iter().sum::<f32>() / 12.0;
    let mean_b = b.iter().sum::<f32>() / 12.0;

    let (mut cov, mut var_a, mut var_b) = (0.0f32, 0.0f32, 0.0f32);
    for (&x, &y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a <= EPSILON || var_b <= EPSILON {
        return None;
    }
    let r = cov / (var_a.sqrt() * var_b.sqrt());
    r.is_finite().then_some(r)
}

/// Index of the largest score, earliest index on ties
fn argmax_first(scores: &[f32; N_KEYS]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s > scores[best] {
            best = i;
        }
    }
    best
}

/// Key for an interleaved score index
fn key_at(idx: usize) -> Key {
    let mode = if idx % 2 == 0 { Mode::Major } else { Mode::Minor };
    Key::new(PitchClass::from_index(idx / 2), mode)
}
