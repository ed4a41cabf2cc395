use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use crate::error::{MonitorError, Result};

pub const DEFAULT_HOSTS: [&str; 3] = ["8.8.8.8", "1.1.1.1", "google.com"];
pub const DEFAULT_THRESHOLD_MS: f64 = 500.0;
pub const DEFAULT_PING_DELAY_SECS: u64 = 1;
pub const DEFAULT_STATS_UPDATE_INTERVAL: u64 = 10;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DNS_TTL_SECS: u64 = 300;

/// Monitor settings. These are compiled in; `Default` is what the binary runs with.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Hosts to probe, in the order they are probed and reported.
    pub hosts: Vec<String>,
    /// Successful probes slower than this are written to the slow log.
    pub threshold_ms: f64,
    /// Pause between the end of one cycle and the start of the next.
    pub ping_delay: Duration,
    /// Number of completed cycles between two stats snapshots.
    pub stats_update_interval: u64,
    /// How long one probe waits for an echo reply.
    pub probe_timeout: Duration,
    /// How long a resolved hostname address is reused before resolving again.
    pub dns_ttl: Duration,
    /// Directory holding raw.txt, slow.txt and stats.txt.
    pub log_dir: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            hosts: DEFAULT_HOSTS.iter().map(|h| h.to_string()).collect(),
            threshold_ms: DEFAULT_THRESHOLD_MS,
            ping_delay: Duration::from_secs(DEFAULT_PING_DELAY_SECS),
            stats_update_interval: DEFAULT_STATS_UPDATE_INTERVAL,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            dns_ttl: Duration::from_secs(DEFAULT_DNS_TTL_SECS),
            log_dir: PathBuf::from("."),
        }
    }
}

impl MonitorConfig {
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_threshold_ms(mut self, threshold_ms: f64) -> Self {
        self.threshold_ms = threshold_ms;
        self
    }

    pub fn with_ping_delay(mut self, ping_delay: Duration) -> Self {
        self.ping_delay = ping_delay;
        self
    }

    pub fn with_stats_update_interval(mut self, interval: u64) -> Self {
        self.stats_update_interval = interval;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_dns_ttl(mut self, dns_ttl: Duration) -> Self {
        self.dns_ttl = dns_ttl;
        self
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    /// Validates the configuration values
    pub fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            return Err(MonitorError::Config("at least one host is required".into()));
        }
        let mut seen = HashSet::new();
        for host in &self.hosts {
            if host.trim().is_empty() {
                return Err(MonitorError::Config("host must not be empty".into()));
            }
            if !seen.insert(host.as_str()) {
                return Err(MonitorError::Config(format!("duplicate host: {host}")));
            }
        }
        if !self.threshold_ms.is_finite() || self.threshold_ms < 0.0 {
            return Err(MonitorError::Config(format!(
                "threshold must be a non-negative number of milliseconds, got {}",
                self.threshold_ms
            )));
        }
        if self.stats_update_interval == 0 {
            return Err(MonitorError::Config("stats update interval must be > 0".into()));
        }
        if self.probe_timeout.is_zero() {
            return Err(MonitorError::Config("probe timeout must be > 0".into()));
        }
        Ok(())
    }
}
