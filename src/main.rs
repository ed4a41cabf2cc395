use ping_logger::{IcmpProber, Monitor, MonitorConfig, MonitorError};

/// Future that resolves on Ctrl+C, or SIGTERM on Unix.
fn shutdown_signal() -> Result<impl Future<Output = ()>, MonitorError> {
    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .map_err(MonitorError::Signal)?;

    Ok(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            sigterm.recv().await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => log::info!("received Ctrl+C"),
            _ = terminate => log::info!("received terminate signal"),
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), MonitorError> {
    env_logger::init();

    let config = MonitorConfig::default();
    let prober = IcmpProber::new(config.probe_timeout, config.dns_ttl);
    let mut monitor = Monitor::new(config, prober)?;

    let config = monitor.config().clone();
    monitor.console_mut().banner(&config);
    let shutdown = shutdown_signal()?;
    monitor.run_until(shutdown).await
}
