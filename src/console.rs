use std::fmt::Display;
use std::io::{self, Write};
use colored::{ColoredString, Colorize};
use crate::config::MonitorConfig;
use crate::logger::format_raw_line;
use crate::ping::{ProbeOutcome, ProbeResult};

/// How a probe is shown on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStyle {
    Normal,
    Slow,
    Failed,
}

impl ProbeStyle {
    pub fn from_outcome(outcome: &ProbeOutcome, threshold_ms: f64) -> Self {
        match outcome.latency_ms() {
            Some(time) if time > threshold_ms => ProbeStyle::Slow,
            Some(_) => ProbeStyle::Normal,
            None => ProbeStyle::Failed,
        }
    }

    pub fn paint(self, text: &str) -> ColoredString {
        match self {
            ProbeStyle::Normal => text.green(),
            ProbeStyle::Slow => text.yellow().bold(),
            ProbeStyle::Failed => text.red(),
        }
    }
}

/// Console output. After the first failed write the console goes quiet; the
/// monitor keeps running.
pub struct Console {
    out: Box<dyn Write>,
    closed: bool,
}

impl Console {
    pub fn new(out: impl Write + 'static) -> Self {
        Self {
            out: Box::new(out),
            closed: false,
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn emit(&mut self, line: impl Display) {
        if self.closed {
            return;
        }
        let written = writeln!(self.out, "{line}").and_then(|_| self.out.flush());
        if let Err(e) = written {
            log::debug!("console output disabled: {e}");
            self.closed = true;
        }
    }

    pub fn banner(&mut self, config: &MonitorConfig) {
        self.emit("Ping Logger".cyan().bold());
        self.emit(format!("Hosts:      {}", config.hosts.join(", ")));
        self.emit(format!("Threshold:  {}ms", config.threshold_ms));
        self.emit(format!("Delay:      {:.1}s", config.ping_delay.as_secs_f64()));
        self.emit(format!("Stats every {} cycles", config.stats_update_interval));
        self.emit("Press Ctrl+C to stop".dimmed());
        self.emit("");
    }

    pub fn probe(&mut self, result: &ProbeResult, threshold_ms: f64) {
        let style = ProbeStyle::from_outcome(&result.outcome, threshold_ms);
        self.emit(style.paint(&format_raw_line(result)));
        if style == ProbeStyle::Slow {
            self.emit("  -> logged to slow.txt".yellow());
        }
    }

    pub fn snapshot_notice(&mut self, cycles: u64) {
        self.emit(format!("Statistics written to stats.txt (cycle {cycles})").cyan());
    }

    pub fn final_notice(&mut self) {
        self.emit("Stopping, final statistics written to stats.txt".cyan().bold());
    }
}
