//! Tracing subscriber setup
//!
//! Startup logs twice over: configuration is resolved under a scoped bootstrap
//! subscriber (so its notices are visible), then the global subscriber is
//! installed with the configured level.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used before the configuration is known
pub const BOOTSTRAP_LEVEL: &str = "info";

/// Subscriber for the configuration phase, writing to stderr
///
/// Meant for `tracing::subscriber::with_default` around config resolution.
pub fn bootstrap_subscriber() -> impl Subscriber + Send + Sync + 'static {
    bootstrap_subscriber_with_writer(std::io::stderr)
}

/// Bootstrap subscriber with a caller-supplied writer
pub fn bootstrap_subscriber_with_writer<W>(make_writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(BOOTSTRAP_LEVEL));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .with_ansi(false)
        .finish()
}

/// Install the global fmt subscriber writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to every target.
pub fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", logging.level, e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| Error::Config(format!("Tracing already initialized: {}", e)))
}
