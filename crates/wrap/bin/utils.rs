use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global tracing subscriber, filtered by `RUST_LOG`.
pub fn subscriber() {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Enables terminal colors when stdout is a TTY that supports them.
pub fn enable_paint() {
    yansi::whenever(yansi::Condition::TTY_AND_COLOR);
}
