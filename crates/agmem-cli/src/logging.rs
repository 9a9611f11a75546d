use crate::args::LogLevel;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `AGMEM_LOG`, then `RUST_LOG`, override `level`.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_env("AGMEM_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    // A second init (e.g. from an embedding test harness) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
