//! Process bootstrap: configuration, logging, database pool and shutdown signals.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod db;
pub mod logging;
pub mod signals;

pub use config::{
    AppConfig, CliArgs, ConfigError, DatabaseConfig, LogFormat, LoggingConfig, ServerConfig,
};
pub use db::{DbConnectError, connect, connect_options, redact_dsn};
pub use logging::init_logging;
pub use signals::{cancel_on_signal, wait_for_shutdown};
