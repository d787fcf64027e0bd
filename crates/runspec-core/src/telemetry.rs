//! Tracing setup for the `runspec` binary.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directives: a non-empty `RUST_LOG`, else `level`.
fn filter_directives(rust_log: Option<String>, level: Level) -> String {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .unwrap_or_else(|| level.as_str().to_ascii_lowercase())
}

/// Install the global subscriber, writing to stderr so stdout carries only
/// command output. `json` selects newline-delimited JSON lines. An invalid
/// `RUST_LOG` falls back to `level`. Later calls are no-ops.
pub fn init_tracing(json: bool, level: Level) {
    let directives = filter_directives(std::env::var("RUST_LOG").ok(), level);
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
