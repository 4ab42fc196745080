use serde::Deserialize;

/// Timing of the five-stage trial template
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrialDurations {
    pub marker_ms: u64,
    pub stimulus_ms: u64,
    /// Gap after each marker and stimulus stage
    pub gap_ms: u64,
    /// Gap after the response, before the next trial
    pub response_gap_ms: u64,
}

impl Default for TrialDurations {
    fn default() -> Self {
        Self {
            marker_ms: 1000,
            stimulus_ms: 1000,
            gap_ms: 500,
            response_gap_ms: 500,
        }
    }
}
