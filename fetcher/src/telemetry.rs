//! Logging setup shared by the demo binary and the test harness.

use tracing::Subscriber;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_log::LogTracer;
use tracing_log::log::SetLoggerError;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to set logger: {0}")]
    Logger(#[from] SetLoggerError),
    #[error("Failed to set subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Log an error if it exists using the alternate selector, which emits the
/// error chain.
pub fn log_error(e: impl Into<anyhow::Error>) {
    let e: anyhow::Error = e.into();
    tracing::error!("{e:#}");
}

/// `RUST_LOG` takes precedence over `default_filter`.
///
/// Logs go to stderr, leaving stdout to whatever the renderers print.
pub fn get_subscriber(default_filter: &str) -> impl Subscriber + Sync + Send {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let stderr = fmt::Layer::new()
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false);
    Registry::default().with(env_filter).with(stderr)
}

/// Register a subscriber as global default and forward `log` records from
/// reqwest and actix into it.
///
/// Only the first call in a process succeeds.
pub fn init_subscriber(
    subscriber: impl Subscriber + Sync + Send,
) -> Result<(), TelemetryError> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}
