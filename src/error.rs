use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that stop the monitor.
///
/// Probe failures are not represented here: they are ordinary outcomes that get
/// counted as lost packets.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to append to {}: {source}", path.display())]
    LogWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
