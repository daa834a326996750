//! Analysis metadata structures

use serde::Serialize;

/// Analysis flags
///
/// Raised whenever an estimate is a fallback rather than a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisFlag {
    /// Recording is below the silence threshold
    SilentInput,
    /// Tempo left at its default value
    DefaultTempo,
    /// No key could be determined
    UnknownKey,
    /// Meter fell back to 4/4 without being measured
    DefaultMeter,
    /// Meter could not be determined
    UnknownMeter,
}

/// Analysis metadata
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// Audio duration in seconds
    pub duration_seconds: f32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Algorithm version
    pub algorithm_version: String,

    /// Methods used
    pub methods_used: Vec<String>,

    /// Analysis flags
    pub flags: Vec<AnalysisFlag>,

    /// Human-readable notes for every defaulted or unknown estimate
    pub warnings: Vec<String>,
}

impl Default for AnalysisMetadata {
    fn default() -> Self {
        Self {
            duration_seconds: 0.0,
            sample_rate: 0,
            processing_time_ms: 0.0,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            methods_used: vec![],
            flags: vec![],
            warnings: vec![],
        }
    }
}

impl AnalysisMetadata {
    /// Record a flag together with its explanation
    pub fn flag(&mut self, flag: AnalysisFlag, warning: impl Into<String>) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
        self.warnings.push(warning.into());
    }

    /// Whether `flag` was raised
    pub fn has_flag(&self, flag: AnalysisFlag) -> bool {
        self.flags.contains(&flag)
    }
}
