//! Logging setup for the duelhub binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown by default besides the binary itself.
const DEFAULT_TARGETS: [&str; 2] = ["duelhub_server", "tower_http"];

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the server library, the HTTP trace
/// layer and the binary log at `default_log_level`.
///
/// # Examples
///
/// ```no_run
/// use duelhub_shared::logger::setup_logger;
///
/// setup_logger("duelhub-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(binary_name, default_log_level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

/// Filter directives used when `RUST_LOG` is not set
fn default_directives(binary_name: &str, level: &str) -> String {
    let binary = binary_name.replace('-', "_");
    let mut targets: Vec<&str> = DEFAULT_TARGETS.to_vec();
    if !targets.contains(&binary.as_str()) {
        targets.push(binary.as_str());
    }
    targets
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
