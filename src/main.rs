// Courier - Reliable telemetry delivery
// Copyright (c) 2025 Courier Contributors
// Licensed under the MIT License

use courier::cli::{Cli, Commands};
use courier::config::{load_config, LoggingConfig};
use courier::logging::init_logging;
use clap::Parser;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the config file when one loads; otherwise console only
    let file_config = load_config(&cli.config).ok();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = file_config
        .map(|c| c.logging)
        .unwrap_or_else(|| LoggingConfig {
            local_enabled: false,
            ..LoggingConfig::default()
        });

    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Courier starting");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        println!("\n⚠️  Shutdown signal received, stopping...");
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

    // process::exit skips destructors, so flush file logs first
    drop(logging_guard);
    process::exit(exit_code);
}

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
            tracing::warn!(error = %e, "Failed to install SIGTERM handler");
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received SIGINT (Ctrl+C)"),
                Err(_) => std::future::pending::<()>().await,
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received SIGINT (Ctrl+C)"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Send(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Drain(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
