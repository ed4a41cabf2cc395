//! Continuous ICMP reachability monitor.
//!
//! Probes a fixed list of hosts in cycles, keeps running latency, jitter and loss
//! statistics per host, and appends raw events, slow probes and periodic
//! statistics snapshots to text logs.

pub mod config;
pub mod console;
pub mod dns_cache;
pub mod error;
pub mod logger;
pub mod monitor;
pub mod ping;
pub mod prober;
pub mod stats;

pub use config::MonitorConfig;
pub use console::Console;
pub use error::{MonitorError, Result};
pub use logger::LogWriter;
pub use monitor::{Monitor, MonitorState};
pub use ping::{ProbeOutcome, ProbeResult};
pub use prober::{IcmpProber, Prober};
pub use stats::{HostStats, HostSummary};
