// Orderflow - Queue-driven order pipeline
// Copyright (c) 2025 Orderflow Contributors
// Licensed under the MIT License

use clap::Parser;
use orderflow::cli::{Cli, Commands};
use orderflow::config::{load_config_or_default, LoggingConfig};
use orderflow::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging settings come from the config file when it loads; commands
    // report configuration errors themselves
    let file_config = load_config_or_default(cli.config.as_deref()).ok();
    let logging_config = file_config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(LoggingConfig::default);
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());

    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Orderflow - Queue-driven order pipeline"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Shutdown signal received, finishing current message...");
        println!("\n⚠️  Shutdown signal received, finishing current message...");
        let _ = shutdown_tx.send(true);
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors
    drop(logging_guard);
    process::exit(exit_code);
}

/// Resolves on SIGINT or SIGTERM
#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT (Ctrl+C)"),
                _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler, listening for Ctrl+C only");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Resolves on Ctrl+C
#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Send(args) => args.execute(config).await,
        Commands::Consume(args) => args.execute(config, shutdown_signal).await,
        Commands::Run(args) => args.execute(config, shutdown_signal).await,
        Commands::Provision(args) => args.execute(config).await,
        Commands::Status(args) => args.execute(config).await,
        Commands::ValidateConfig(args) => args.execute(config).await,
        Commands::Init(args) => args.execute().await,
    }
}
