//! The monitoring loop.
//!
//! A [`Monitor`] owns everything mutable: the host list, the per-host statistics,
//! the prober and the log writer. Hosts are probed one after another on a single
//! task, so the raw log order is deterministic and stats need no locking.

use std::collections::HashMap;
use std::pin::pin;
use chrono::Local;
use crate::config::MonitorConfig;
use crate::console::Console;
use crate::error::Result;
use crate::logger::LogWriter;
use crate::ping::ProbeResult;
use crate::prober::Prober;
use crate::stats::HostStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Running,
    Draining,
    Stopped,
}

pub struct Monitor<P> {
    config: MonitorConfig,
    prober: P,
    writer: LogWriter,
    stats: HashMap<String, HostStats>,
    console: Console,
    cycles_completed: u64,
    state: MonitorState,
}

impl<P: Prober> Monitor<P> {
    pub fn new(config: MonitorConfig, prober: P) -> Result<Self> {
        config.validate()?;
        let writer = LogWriter::new(&config.log_dir);
        let stats = config
            .hosts
            .iter()
            .map(|host| (host.clone(), HostStats::new()))
            .collect();
        Ok(Self {
            config,
            prober,
            writer,
            stats,
            console: Console::stdout(),
            cycles_completed: 0,
            state: MonitorState::Running,
        })
    }

    /// Replaces the stdout console, e.g. to silence or capture output.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn hosts(&self) -> &[String] {
        &self.config.hosts
    }

    pub fn stats(&self, host: &str) -> Option<&HostStats> {
        self.stats.get(host)
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    pub fn writer(&self) -> &LogWriter {
        &self.writer
    }

    /// Probes every host once, in configured order, then writes a snapshot if this
    /// cycle completes a stats interval.
    pub async fn run_cycle(&mut self) -> Result<()> {
        let threshold_ms = self.config.threshold_ms;
        for index in 0..self.config.hosts.len() {
            let host = &self.config.hosts[index];
            let timestamp = Local::now();
            let outcome = self.prober.probe(host).await;
            let result = ProbeResult::new(host.as_str(), timestamp, outcome);

            // Nothing below awaits, so a probe is either fully accounted or not at all.
            if let Some(stats) = self.stats.get_mut(host) {
                stats.record(&result.outcome);
            }
            self.writer.log_probe(&result)?;
            self.writer.log_slow(&result, threshold_ms)?;
            self.console.probe(&result, threshold_ms);
        }

        self.cycles_completed += 1;
        if self.cycles_completed % self.config.stats_update_interval == 0 {
            self.write_snapshot()?;
            self.console.snapshot_notice(self.cycles_completed);
        }
        Ok(())
    }

    /// Appends a snapshot of every host's current statistics to the stats log.
    pub fn write_snapshot(&self) -> Result<()> {
        let summaries = self.config.hosts.iter().filter_map(|host| {
            self.stats
                .get(host)
                .map(|stats| (host.as_str(), stats.summary()))
        });
        self.writer.log_snapshot(Local::now(), summaries)?;
        log::info!("stats snapshot written after {} cycles", self.cycles_completed);
        Ok(())
    }

    async fn run_forever(&mut self) -> Result<()> {
        loop {
            self.run_cycle().await?;
            tokio::time::sleep(self.config.ping_delay).await;
        }
    }

    /// Runs cycles until `shutdown` resolves, then writes one final snapshot.
    ///
    /// Shutdown abandons whatever probe or sleep is in flight. A log write failure
    /// ends the run immediately with that error and no final snapshot.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let shutdown = pin!(shutdown);
        self.state = MonitorState::Running;
        log::info!("monitoring {} hosts", self.config.hosts.len());

        let outcome = tokio::select! {
            result = self.run_forever() => Some(result),
            _ = shutdown => None,
        };

        if let Some(Err(e)) = outcome {
            log::error!("monitoring aborted: {e}");
            self.state = MonitorState::Stopped;
            return Err(e);
        }

        self.state = MonitorState::Draining;
        log::info!("shutdown requested, writing final statistics");
        let result = self.write_snapshot();
        self.state = MonitorState::Stopped;
        result?;
        self.console.final_notice();
        Ok(())
    }
}
