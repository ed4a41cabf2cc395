use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use ping_logger::{
    Console, HostSummary, Monitor, MonitorConfig, MonitorError, MonitorState, ProbeOutcome, Prober, Result,
};
use tokio::sync::oneshot;

/// Test helper: replays a fixed list of outcomes, then fires `exhausted` and hangs
/// like a probe that never gets a reply.
struct ScriptedProber {
    script: VecDeque<ProbeOutcome>,
    probed: Vec<String>,
    exhausted: Option<oneshot::Sender<()>>,
}

impl ScriptedProber {
    fn new(script: impl IntoIterator<Item = ProbeOutcome>) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let prober = Self {
            script: script.into_iter().collect(),
            probed: Vec::new(),
            exhausted: Some(tx),
        };
        (prober, rx)
    }
}

impl Prober for ScriptedProber {
    async fn probe(&mut self, host: &str) -> ProbeOutcome {
        self.probed.push(host.to_string());
        if let Some(outcome) = self.script.pop_front() {
            return outcome;
        }
        if let Some(tx) = self.exhausted.take() {
            let _ = tx.send(());
        }
        std::future::pending().await
    }
}

fn test_config(dir: &Path, hosts: &[&str]) -> MonitorConfig {
    MonitorConfig::default()
        .with_hosts(hosts.iter().copied())
        .with_threshold_ms(500.0)
        .with_ping_delay(Duration::ZERO)
        .with_stats_update_interval(1000)
        .with_log_dir(dir)
}

fn ok(latency_ms: f64) -> ProbeOutcome {
    ProbeOutcome::success(latency_ms)
}

async fn run_script(
    config: MonitorConfig,
    script: Vec<ProbeOutcome>,
) -> Result<Monitor<ScriptedProber>> {
    run_script_with_console(config, script, Console::new(io::sink())).await
}

async fn run_script_with_console(
    config: MonitorConfig,
    script: Vec<ProbeOutcome>,
    console: Console,
) -> Result<Monitor<ScriptedProber>> {
    let (prober, exhausted) = ScriptedProber::new(script);
    let mut monitor = Monitor::new(config, prober)?.with_console(console);
    monitor
        .run_until(async {
            let _ = exhausted.await;
        })
        .await?;
    Ok(monitor)
}

/// Test helper: stdout whose reader has gone away, as with `ping-logger | head -1`.
struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

fn snapshot_count(stats_log: &str) -> usize {
    stats_log.matches("PING STATISTICS - Updated:").count()
}

/// Test helper: parses the host sections of the last block in a stats log.
fn parse_last_block(stats_log: &str) -> Vec<(String, HostSummary)> {
    let block = stats_log
        .rsplit("PING STATISTICS - Updated:")
        .next()
        .expect("no stats block");

    fn value<'a>(line: &'a str, label: &str) -> &'a str {
        line.strip_prefix(label)
            .unwrap_or_else(|| panic!("expected {label:?} in {line:?}"))
            .trim()
    }
    fn ms(text: &str) -> f64 {
        text.trim_end_matches("ms").parse().unwrap()
    }

    let lines: Vec<&str> = block.lines().collect();
    let mut hosts = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let Some(host) = line.strip_prefix("Host: ") else {
            continue;
        };
        let field = |offset: usize, label: &str| value(lines[i + offset], label);
        let (lost, loss) = field(4, "Packets Lost:").split_once(' ').unwrap();
        hosts.push((
            host.to_string(),
            HostSummary {
                sent: field(2, "Packets Sent:").parse().unwrap(),
                received: field(3, "Packets Received:").parse().unwrap(),
                lost: lost.parse().unwrap(),
                loss_percent: loss
                    .trim_start_matches('(')
                    .trim_end_matches("%)")
                    .parse()
                    .unwrap(),
                min_ms: ms(field(5, "Min Latency:")),
                max_ms: ms(field(6, "Max Latency:")),
                avg_ms: ms(field(7, "Avg Latency:")),
                jitter_ms: ms(field(8, "Jitter:")),
            },
        ));
    }
    hosts
}

#[tokio::test]
async fn test_slow_probes_are_logged_separately() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &["10.0.0.1"]);
    let monitor = run_script(config, vec![ok(100.0), ok(600.0), ok(200.0)]).await?;

    let raw = read(monitor.writer().raw_path());
    let raw_lines: Vec<&str> = raw.lines().collect();
    assert_eq!(raw_lines.len(), 3);
    assert!(raw_lines[0].ends_with("10.0.0.1 - Reply: 100.00ms"));
    assert!(raw_lines[1].ends_with("10.0.0.1 - Reply: 600.00ms"));
    assert!(raw_lines[2].ends_with("10.0.0.1 - Reply: 200.00ms"));

    let slow = read(monitor.writer().slow_path());
    let slow_lines: Vec<&str> = slow.lines().collect();
    assert_eq!(slow_lines.len(), 1);
    assert!(slow_lines[0].ends_with("10.0.0.1 - SLOW PING: 600.00ms (threshold: 500ms)"));
    Ok(())
}

#[tokio::test]
async fn test_failures_go_to_raw_log_only() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &["10.0.0.1"]).with_threshold_ms(0.0);
    let monitor = run_script(config, vec![ProbeOutcome::Failure, ProbeOutcome::Failure]).await?;

    let raw = read(monitor.writer().raw_path());
    assert_eq!(raw.lines().count(), 2);
    assert!(
        raw.lines()
            .all(|l| l.ends_with("10.0.0.1 - Request timed out / Host unreachable"))
    );
    assert!(!monitor.writer().slow_path().exists());

    let stats = monitor.stats("10.0.0.1").unwrap();
    assert_eq!((stats.sent(), stats.received(), stats.lost()), (2, 0, 2));
    assert_eq!(stats.reported_min(), 0.0);
    Ok(())
}

#[tokio::test]
async fn test_hosts_probed_in_configured_order() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let hosts = ["b.example", "a.example", "c.example"];
    let config = test_config(dir.path(), &hosts);
    let script = vec![ok(1.0), ProbeOutcome::Failure, ok(3.0), ok(4.0), ok(5.0), ok(6.0)];
    let monitor = run_script(config, script).await?;

    let raw = read(monitor.writer().raw_path());
    let order: Vec<&str> = raw
        .lines()
        .map(|l| l.split("] ").nth(1).unwrap().split(" - ").next().unwrap())
        .collect();
    assert_eq!(order, ["b.example", "a.example", "c.example"].repeat(2));
    assert_eq!(monitor.cycles_completed(), 2);

    for host in hosts {
        let stats = monitor.stats(host).unwrap();
        assert_eq!(stats.sent(), stats.received() + stats.lost());
    }
    assert_eq!(monitor.stats("a.example").unwrap().lost(), 1);
    Ok(())
}

#[tokio::test]
async fn test_snapshot_every_interval_plus_final() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &["10.0.0.1"]).with_stats_update_interval(2);
    // Five full cycles: snapshots after cycles 2 and 4, then shutdown during cycle 6.
    let script = (1..=5).map(|i| ok(i as f64 * 10.0)).collect();
    let monitor = run_script(config, script).await?;

    assert_eq!(monitor.cycles_completed(), 5);
    assert_eq!(monitor.state(), MonitorState::Stopped);
    assert_eq!(snapshot_count(&read(monitor.writer().stats_path())), 3);
    Ok(())
}

#[tokio::test]
async fn test_snapshot_written_after_exact_interval() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &["10.0.0.1", "10.0.0.2"]).with_stats_update_interval(3);
    let (prober, _exhausted) = ScriptedProber::new(vec![ok(1.0); 6]);
    let mut monitor = Monitor::new(config, prober)?.with_console(Console::new(io::sink()));
    let stats_path = monitor.writer().stats_path().to_path_buf();

    monitor.run_cycle().await?;
    monitor.run_cycle().await?;
    assert!(!stats_path.exists());

    monitor.run_cycle().await?;
    assert_eq!(snapshot_count(&read(&stats_path)), 1);
    assert_eq!(monitor.state(), MonitorState::Running);
    Ok(())
}

#[tokio::test]
async fn test_shutdown_before_first_interval_still_writes_snapshot() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &["10.0.0.1"]);
    let monitor = run_script(config, vec![]).await?;

    assert_eq!(monitor.cycles_completed(), 0);
    let stats_log = read(monitor.writer().stats_path());
    assert_eq!(snapshot_count(&stats_log), 1);

    let parsed = parse_last_block(&stats_log);
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].1.sent, 0);
    assert_eq!(parsed[0].1.loss_percent, 0.0);
    assert_eq!(parsed[0].1.min_ms, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_stats_block_matches_memory() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &["10.0.0.1", "10.0.0.2"]);
    let script = vec![
        ok(10.0),
        ProbeOutcome::Failure,
        ok(15.0),
        ok(42.125),
        ok(12.0),
        ProbeOutcome::Failure,
        ok(15.5),
        ok(7.25),
    ];
    let monitor = run_script(config, script).await?;

    let parsed = parse_last_block(&read(monitor.writer().stats_path()));
    let hosts: Vec<&str> = parsed.iter().map(|(h, _)| h.as_str()).collect();
    assert_eq!(hosts, ["10.0.0.1", "10.0.0.2"]);
    for (host, summary) in &parsed {
        assert_eq!(*summary, monitor.stats(host).unwrap().summary());
    }

    let first = &parsed[0].1;
    assert_eq!((first.sent, first.received, first.lost), (4, 4, 0));
    // |15 - 10|, |12 - 15|, |15.5 - 12|
    assert_eq!(first.jitter_ms, 3.83);
    assert_eq!(first.min_ms, 10.0);
    assert_eq!(first.max_ms, 15.5);
    Ok(())
}

#[tokio::test]
async fn test_shutdown_mid_probe_keeps_completed_probes() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    // Shutdown fires while the third host of the first cycle is being probed.
    let monitor = run_script(config, vec![ok(5.0), ProbeOutcome::Failure]).await?;

    assert_eq!(monitor.cycles_completed(), 0);
    assert_eq!(read(monitor.writer().raw_path()).lines().count(), 2);
    assert_eq!(monitor.stats("10.0.0.3").unwrap().sent(), 0);
    assert_eq!(monitor.prober().probed.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_unwritable_log_dir_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir.path().join("does-not-exist"), &["10.0.0.1"]);
    let (prober, _exhausted) = ScriptedProber::new(vec![ok(1.0); 3]);
    let mut monitor = Monitor::new(config, prober)
        .unwrap()
        .with_console(Console::new(io::sink()));

    let result = monitor.run_until(std::future::pending::<()>()).await;
    assert!(matches!(result, Err(MonitorError::LogWrite { .. })));
    assert_eq!(monitor.state(), MonitorState::Stopped);
    // The probe itself was counted before the write failed.
    assert_eq!(monitor.stats("10.0.0.1").unwrap().sent(), 1);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &["10.0.0.1"]).with_stats_update_interval(0);
    let (prober, _exhausted) = ScriptedProber::new(vec![]);
    assert!(matches!(
        Monitor::new(config, prober),
        Err(MonitorError::Config(_))
    ));
}

#[tokio::test]
async fn test_independent_monitors_do_not_share_stats() -> Result<()> {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let a = run_script(test_config(dir_a.path(), &["10.0.0.1"]), vec![ok(1.0), ok(2.0)]).await?;
    let b = run_script(test_config(dir_b.path(), &["10.0.0.2"]), vec![ProbeOutcome::Failure]).await?;

    assert!(a.stats("10.0.0.2").is_none());
    assert!(b.stats("10.0.0.1").is_none());
    assert_eq!(a.stats("10.0.0.1").unwrap().sent(), 2);
    assert_eq!(b.stats("10.0.0.2").unwrap().lost(), 1);
    assert!(!read(a.writer().raw_path()).contains("10.0.0.2"));
    Ok(())
}

#[tokio::test]
async fn test_closed_console_still_writes_logs_and_final_snapshot() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &["10.0.0.1"]).with_stats_update_interval(2);
    let script = vec![ok(10.0), ok(700.0), ProbeOutcome::Failure];
    let mut monitor =
        run_script_with_console(config, script, Console::new(ClosedPipe)).await?;

    assert!(monitor.console_mut().is_closed());
    assert_eq!(monitor.state(), MonitorState::Stopped);
    assert_eq!(read(monitor.writer().raw_path()).lines().count(), 3);
    assert_eq!(read(monitor.writer().slow_path()).lines().count(), 1);

    let stats_log = read(monitor.writer().stats_path());
    assert_eq!(snapshot_count(&stats_log), 2);
    let parsed = parse_last_block(&stats_log);
    assert_eq!(parsed[0].1, monitor.stats("10.0.0.1").unwrap().summary());
    assert_eq!((parsed[0].1.sent, parsed[0].1.lost), (3, 1));
    Ok(())
}
