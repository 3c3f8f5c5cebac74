//! Logging setup utilities for the velochat front-ends.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the chat library crate and the calling binary. It can be
/// overridden with the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "velochat-customer")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn")
///
/// # Examples
///
/// ```no_run
/// use velochat_shared::logger::setup_logger;
///
/// setup_logger("velochat-staff", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the default `EnvFilter` directive for a binary.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "velochat_client={},{}={}",
        default_log_level,
        binary_name.replace('-', "_"),
        default_log_level
    )
}
