use std::collections::VecDeque;
use crate::ping::ProbeOutcome;

/// Number of recent latencies kept for jitter.
pub const RECENT_LATENCY_CAPACITY: usize = 100;

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Running aggregate for one host.
#[derive(Debug, Clone, Default)]
pub struct HostStats {
    sent: u64,
    received: u64,
    lost: u64,
    min_latency_ms: Option<f64>,
    max_latency_ms: f64,
    sum_latency_ms: f64,
    recent_latencies: VecDeque<f64>,
}

/// Rounded view of a `HostStats`, as it appears in a stats snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSummary {
    pub sent: u64,
    pub received: u64,
    pub lost: u64,
    pub loss_percent: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,
    pub jitter_ms: f64,
}

impl HostStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &ProbeOutcome) {
        self.sent += 1;
        match *outcome {
            ProbeOutcome::Success { latency_ms } => {
                self.received += 1;
                self.sum_latency_ms += latency_ms;
                self.recent_latencies.push_back(latency_ms);
                if self.recent_latencies.len() > RECENT_LATENCY_CAPACITY {
                    self.recent_latencies.pop_front();
                }
                self.min_latency_ms = Some(match self.min_latency_ms {
                    Some(min) => min.min(latency_ms),
                    None => latency_ms,
                });
                self.max_latency_ms = self.max_latency_ms.max(latency_ms);
            }
            ProbeOutcome::Failure => self.lost += 1,
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn lost(&self) -> u64 {
        self.lost
    }

    /// Smallest latency seen, `None` until the first successful probe.
    pub fn min_latency_ms(&self) -> Option<f64> {
        self.min_latency_ms
    }

    pub fn max_latency_ms(&self) -> f64 {
        self.max_latency_ms
    }

    /// Oldest first.
    pub fn recent_latencies(&self) -> &VecDeque<f64> {
        &self.recent_latencies
    }

    /// Mean absolute difference between consecutive recent latencies.
    pub fn jitter(&self) -> f64 {
        if self.recent_latencies.len() < 2 {
            return 0.0;
        }
        let (total, pairs) = self
            .recent_latencies
            .iter()
            .zip(self.recent_latencies.iter().skip(1))
            .fold((0.0, 0usize), |(total, pairs), (prev, next)| {
                (total + (next - prev).abs(), pairs + 1)
            });
        round2(total / pairs as f64)
    }

    pub fn loss_percent(&self) -> f64 {
        if self.sent == 0 {
            return 0.0;
        }
        round2(100.0 * self.lost as f64 / self.sent as f64)
    }

    pub fn average_latency(&self) -> f64 {
        if self.received == 0 {
            return 0.0;
        }
        round2(self.sum_latency_ms / self.received as f64)
    }

    pub fn reported_min(&self) -> f64 {
        self.min_latency_ms.unwrap_or(0.0)
    }

    pub fn summary(&self) -> HostSummary {
        HostSummary {
            sent: self.sent,
            received: self.received,
            lost: self.lost,
            loss_percent: self.loss_percent(),
            min_ms: round2(self.reported_min()),
            max_ms: round2(self.max_latency_ms),
            avg_ms: self.average_latency(),
            jitter_ms: self.jitter(),
        }
    }
}
