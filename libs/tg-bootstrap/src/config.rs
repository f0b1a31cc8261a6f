//! Layered application configuration.
//!
//! Precedence, later wins:
//! 1) built-in defaults
//! 2) YAML file (`--config`)
//! 3) environment variables `APP__<SECTION>__<KEY>`
//! 4) `DATABASE_URL`
//! 5) CLI overrides

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tg_errors::ClassifierPolicy;

/// Prefix of the environment layer. `APP__DATABASE__DSN` maps to `database.dsn`.
pub const ENV_PREFIX: &str = "APP__";

/// Shortcut variable for the database DSN.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// DSN used by `--mock`.
pub const MOCK_DSN: &str = "sqlite::memory:";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {path}")]
    MissingFile { path: String },
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid config for module '{module}': {source}")]
    InvalidModuleConfig {
        module: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            request_timeout_secs: 30,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub dsn: String,
    pub max_conns: u32,
    pub min_conns: u32,
    pub acquire_timeout_secs: u64,
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite://users.db?mode=rwc".to_owned(),
            max_conns: 10,
            min_conns: 1,
            acquire_timeout_secs: 5,
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG` when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

/// Whole application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub errors: ClassifierPolicy,
    /// Raw per-module sections, `modules.<name>.config` holds the typed part.
    pub modules: BTreeMap<String, serde_json::Value>,
}

/// Command line values that take precedence over every other layer.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub port: Option<u16>,
    pub verbose: u8,
    pub mock: bool,
}

impl AppConfig {
    /// Load configuration from defaults, an optional YAML file and the environment.
    ///
    /// # Errors
    /// Returns an error if the file is missing or any layer fails to deserialize.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::MissingFile {
                    path: path.to_string_lossy().into_owned(),
                });
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config: Self = figment.extract().map_err(Box::new)?;

        if let Ok(url) = std::env::var(DATABASE_URL_ENV)
            && !url.trim().is_empty()
        {
            config.database.dsn = url;
        }

        Ok(config)
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.bind_addr.set_port(port);
        }

        match args.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }

        if args.mock {
            // Every connection to an in-memory SQLite database sees its own
            // database, so the pool is pinned to a single connection.
            MOCK_DSN.clone_into(&mut self.database.dsn);
            self.database.max_conns = 1;
            self.database.min_conns = 1;
        }
    }

    /// Render the effective configuration with the DSN password redacted.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_pretty_json(&self) -> anyhow::Result<String> {
        let mut redacted = self.clone();
        redacted.database.dsn = crate::db::redact_dsn(&self.database.dsn);
        Ok(serde_json::to_string_pretty(&redacted)?)
    }

    /// Lenient typed access to `modules.<name>.config`.
    ///
    /// Missing module, non-object module or missing `config` yield `T::default()`.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidModuleConfig` if the section exists but is invalid.
    pub fn module_config_or_default<T: DeserializeOwned + Default>(
        &self,
        module_name: &str,
    ) -> Result<T, ConfigError> {
        let Some(config_section) = self
            .modules
            .get(module_name)
            .and_then(serde_json::Value::as_object)
            .and_then(|obj| obj.get("config"))
        else {
            return Ok(T::default());
        };

        serde_json::from_value(config_section.clone()).map_err(|e| {
            ConfigError::InvalidModuleConfig {
                module: module_name.to_owned(),
                source: e,
            }
        })
    }
}
