//! Logging setup with journald support on Linux.
//!
//! On Linux the subscriber prefers systemd-journald; elsewhere, or when
//! journald is unavailable, logs roll daily into a file under the data
//! directory. The level is controlled by the `HEARTH_LOG` environment
//! variable (`error`, `warn`, `info` (default), `debug`, `trace`).

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init(data_dir: &Path) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_env("HEARTH_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(journald_layer)
                .init();

            tracing::info!("logging initialized with journald backend");
            return Ok(());
        }
    }

    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "hearth.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the appender guard alive for the lifetime of the process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("logging initialized with file backend at {:?}", log_dir);
    Ok(())
}
