use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured level with a full
/// filter directive, e.g. `HEALTH_RECORDS_LOG=health_records=debug`.
pub const LOG_ENV: &str = "HEALTH_RECORDS_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    /// A global subscriber was already installed, usually by an earlier call.
    #[error("failed to initialize tracing subscriber: {0}")]
    Init(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Install the global subscriber. Logs go to stderr so CLI output stays clean.
pub fn init(level: &str) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(LoggingError::Init)
}
