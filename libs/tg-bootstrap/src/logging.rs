//! Global `tracing` subscriber installation.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

/// Noisy dependencies kept at `warn` unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: &[&str] = &["sqlx=warn", "sea_orm_migration=warn", "hyper=warn"];

fn default_directives(level: &str) -> String {
    let mut directives = vec![level.trim()];
    directives.extend_from_slice(QUIET_TARGETS);
    directives.join(",")
}

/// Build the filter: `RUST_LOG` if set, otherwise the configured level.
#[must_use]
pub fn build_filter(cfg: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(&cfg.level)))
        .unwrap_or_else(|e| {
            eprintln!("invalid log level '{}' ({e}), falling back to info", cfg.level);
            EnvFilter::new(default_directives("info"))
        })
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(cfg: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(build_filter(cfg));

    let result = match cfg.format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("global tracing subscriber already installed");
    }
}
