use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tg_bootstrap::{AppConfig, CliArgs};
use tg_errors::{ErrorClassifier, TracingReporter};
use tokio_util::sync::CancellationToken;
use users::{MODULE_NAME, ServiceConfig, UsersModule};

/// Users Server - Telegram account registry
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - Telegram account registry")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        port: cli.port,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (APP__*, DATABASE_URL) -> 4) CLI overrides
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    tg_bootstrap::init_logging(&config.logging);
    tracing::info!("Users Server starting");

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_pretty_json()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn users_config(config: &AppConfig) -> Result<ServiceConfig> {
    config
        .module_config_or_default::<ServiceConfig>(MODULE_NAME)
        .context("invalid users module configuration")
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    users_config(config)?;
    println!("Configuration is valid");
    println!("{}", config.to_pretty_json()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    let users_cfg = users_config(&config)?;

    let db = tg_bootstrap::connect(&config.database).await?;
    let module = UsersModule::init(db, users_cfg).await?;

    let classifier = ErrorClassifier::new(config.errors, Arc::new(TracingReporter));
    let router = users_server::build_router(module.router(), classifier, &config.server);

    let cancel = CancellationToken::new();
    tg_bootstrap::cancel_on_signal(cancel.clone());

    users_server::serve(router, config.server.bind_addr, cancel).await
}
