//! Diagnostics go to stderr through `tracing`, filtered by `TASKBOARD_LOG`
//! (any `EnvFilter` directive, e.g. `debug` or `taskboard::listener=trace`).
//! Defaults to `warn` so stdout and the terminal dashboard stay clean.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TASKBOARD_LOG";

pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second call (e.g. from tests) leaves the first subscriber in place.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
