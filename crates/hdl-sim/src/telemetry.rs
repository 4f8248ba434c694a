//! Tracing set-up for the `hdlflow` binary.
//!
//! Filtering comes from `HDLFLOW_LOG`, then `RUST_LOG`, then
//! [`default_directive`], which keeps dependency chatter at `warn` while the
//! project crates log at the requested level.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "HDLFLOW_LOG";

/// Crates whose events follow the requested level.
const PROJECT_TARGETS: [&str; 3] = ["hdl_sim", "hdl_manifest", "hdlflow"];

/// Filter directive used when neither log variable is set.
pub fn default_directive(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    std::iter::once("warn".to_string())
        .chain(PROJECT_TARGETS.iter().map(|t| format!("{t}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)))
}

/// Install the global subscriber; later calls are no-ops.
///
/// Logs go to stderr so report lines on stdout stay machine-readable. Event
/// targets are shown only at `DEBUG` and below.
pub fn init_tracing(json: bool, level: Level) {
    let show_target = level >= Level::DEBUG;
    let layer = fmt::layer()
        .with_target(show_target)
        .with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(env_filter(level));
    if json {
        registry.with(layer.json()).try_init().ok();
    } else {
        registry.with(layer).try_init().ok();
    }
}
