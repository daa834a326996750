//! Period estimation modules
//!
//! Convert the onset-strength envelope to BPM candidates using
//! FFT-accelerated autocorrelation with a log-normal tempo prior.

pub mod autocorrelation;

pub use autocorrelation::{estimate_tempo, TempoSearch};

use crate::analysis::result::{EstimateStatus, InsufficientData};
use serde::Serialize;

/// BPM reported when tempo could not be measured
pub const DEFAULT_BPM: f32 = 0.0;

/// BPM candidate with confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BpmCandidate {
    /// BPM estimate
    pub bpm: f32,

    /// Confidence score (0.0-1.0)
    pub confidence: f32,
}

/// Tempo estimate for one recording
#[derive(Debug, Clone, Serialize)]
pub struct TempoEstimate {
    /// Primary BPM ([`DEFAULT_BPM`] unless `status` is measured)
    pub bpm: f32,

    /// Confidence of the primary candidate (0.0-1.0)
    pub confidence: f32,

    /// Ranked candidates, primary first; empty when not measured
    pub candidates: Vec<BpmCandidate>,

    /// Measured, or defaulted with a reason
    pub status: EstimateStatus,
}

impl TempoEstimate {
    /// Estimate built from ranked candidates; the first becomes the primary
    pub fn measured(candidates: Vec<BpmCandidate>) -> Self {
        match candidates.first().copied() {
            Some(primary) => Self {
                bpm: primary.bpm,
                confidence: primary.confidence,
                candidates,
                status: EstimateStatus::Measured,
            },
            None => Self::defaulted(InsufficientData::NoPeriodicity),
        }
    }

    /// Default estimate carrying the reason measurement was impossible
    pub fn defaulted(reason: InsufficientData) -> Self {
        Self {
            bpm: DEFAULT_BPM,
            confidence: 0.0,
            candidates: vec![],
            status: EstimateStatus::Defaulted(reason),
        }
    }

    /// Primary BPM, or `None` when it was not measured
    pub fn measured_bpm(&self) -> Option<f32> {
        self.status.is_measured().then_some(self.bpm)
    }
}
