use chrono::{DateTime, Local};

/// What a single probe produced. Every kind of failure collapses into `Failure`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    Success { latency_ms: f64 },
    Failure,
}

impl ProbeOutcome {
    pub fn success(latency_ms: f64) -> Self {
        ProbeOutcome::Success { latency_ms }
    }

    pub fn latency_ms(&self) -> Option<f64> {
        match self {
            ProbeOutcome::Success { latency_ms } => Some(*latency_ms),
            ProbeOutcome::Failure => None,
        }
    }

    /// True only for successful probes strictly slower than `threshold_ms`.
    pub fn exceeds(&self, threshold_ms: f64) -> bool {
        self.latency_ms().is_some_and(|t| t > threshold_ms)
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub host: String,
    pub timestamp: DateTime<Local>,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn new(host: impl Into<String>, timestamp: DateTime<Local>, outcome: ProbeOutcome) -> Self {
        Self {
            host: host.into(),
            timestamp,
            outcome,
        }
    }
}
