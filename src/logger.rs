//! Append-only text logs: raw probe events, slow probes and stats snapshots.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use crate::error::{MonitorError, Result};
use crate::ping::{ProbeOutcome, ProbeResult};
use crate::stats::HostSummary;

pub const RAW_LOG_FILE: &str = "raw.txt";
pub const SLOW_LOG_FILE: &str = "slow.txt";
pub const STATS_LOG_FILE: &str = "stats.txt";

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

const BANNER_WIDTH: usize = 70;
const SEPARATOR_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 18;

const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Raw log line, without line ending.
pub fn format_raw_line(result: &ProbeResult) -> String {
    let timestamp = result.timestamp.format(EVENT_TIMESTAMP_FORMAT);
    match result.outcome {
        ProbeOutcome::Success { latency_ms } => {
            format!("[{timestamp}] {} - Reply: {latency_ms:.2}ms", result.host)
        }
        ProbeOutcome::Failure => {
            format!("[{timestamp}] {} - Request timed out / Host unreachable", result.host)
        }
    }
}

/// Slow log line, or `None` unless the probe succeeded above the threshold.
pub fn format_slow_line(result: &ProbeResult, threshold_ms: f64) -> Option<String> {
    if !result.outcome.exceeds(threshold_ms) {
        return None;
    }
    let latency_ms = result.outcome.latency_ms()?;
    Some(format!(
        "[{}] {} - SLOW PING: {latency_ms:.2}ms (threshold: {threshold_ms}ms)",
        result.timestamp.format(EVENT_TIMESTAMP_FORMAT),
        result.host
    ))
}

fn labelled(label: &str, value: impl std::fmt::Display) -> String {
    format!("{:<width$}{}", format!("{label}:"), value, width = LABEL_WIDTH)
}

/// Full stats block, hosts in the given order, each line terminated.
pub fn format_snapshot<'a, I>(timestamp: DateTime<Local>, hosts: I) -> String
where
    I: IntoIterator<Item = (&'a str, HostSummary)>,
{
    let banner = "=".repeat(BANNER_WIDTH);
    let mut lines = vec![
        banner.clone(),
        format!(
            "PING STATISTICS - Updated: {}",
            timestamp.format(SNAPSHOT_TIMESTAMP_FORMAT)
        ),
        banner,
    ];

    for (host, summary) in hosts {
        lines.push(String::new());
        lines.push(format!("Host: {host}"));
        lines.push("-".repeat(SEPARATOR_WIDTH));
        lines.push(labelled("Packets Sent", summary.sent));
        lines.push(labelled("Packets Received", summary.received));
        lines.push(labelled(
            "Packets Lost",
            format!("{} ({:.2}%)", summary.lost, summary.loss_percent),
        ));
        lines.push(labelled("Min Latency", format!("{:.2}ms", summary.min_ms)));
        lines.push(labelled("Max Latency", format!("{:.2}ms", summary.max_ms)));
        lines.push(labelled("Avg Latency", format!("{:.2}ms", summary.avg_ms)));
        lines.push(labelled("Jitter", format!("{:.2}ms", summary.jitter_ms)));
    }
    lines.push(String::new());
    lines.push(String::new());

    let mut block = lines.join(LINE_ENDING);
    block.push_str(LINE_ENDING);
    block
}

/// Writes the three log files. Every write reopens its file in append mode.
#[derive(Debug, Clone)]
pub struct LogWriter {
    raw_path: PathBuf,
    slow_path: PathBuf,
    stats_path: PathBuf,
}

impl LogWriter {
    pub fn new(log_dir: impl AsRef<Path>) -> Self {
        let log_dir = log_dir.as_ref();
        Self {
            raw_path: log_dir.join(RAW_LOG_FILE),
            slow_path: log_dir.join(SLOW_LOG_FILE),
            stats_path: log_dir.join(STATS_LOG_FILE),
        }
    }

    pub fn raw_path(&self) -> &Path {
        &self.raw_path
    }

    pub fn slow_path(&self) -> &Path {
        &self.slow_path
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    pub fn log_probe(&self, result: &ProbeResult) -> Result<()> {
        let mut line = format_raw_line(result);
        line.push_str(LINE_ENDING);
        append(&self.raw_path, &line)
    }

    /// Returns whether a line was written.
    pub fn log_slow(&self, result: &ProbeResult, threshold_ms: f64) -> Result<bool> {
        match format_slow_line(result, threshold_ms) {
            Some(mut line) => {
                line.push_str(LINE_ENDING);
                append(&self.slow_path, &line)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn log_snapshot<'a, I>(&self, timestamp: DateTime<Local>, hosts: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, HostSummary)>,
    {
        append(&self.stats_path, &format_snapshot(timestamp, hosts))
    }
}

fn append(path: &Path, text: &str) -> Result<()> {
    let write = || -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(text.as_bytes())
    };
    write().map_err(|source| MonitorError::LogWrite {
        path: path.to_path_buf(),
        source,
    })
}
