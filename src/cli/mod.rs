//! CLI interface and argument parsing
//!
//! Exit codes: 0 success, 1 some queued batches were dropped during a drain,
//! 2 configuration error, 3 export failed, 5 fatal error.

pub mod commands;

use clap::{Parser, Subcommand};

/// Courier - reliable telemetry delivery
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(version, about, long_about = None)]
#[command(author = "Courier Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "courier.toml", env = "COURIER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "COURIER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a JSON file of envelopes
    Send(commands::send::SendArgs),

    /// Re-send batches waiting in the retry queue
    Drain(commands::drain::DrainArgs),

    /// Show retry queue size
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_send() {
        let cli = Cli::parse_from(["courier", "send", "batch.json"]);
        assert_eq!(cli.config, "courier.toml");
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.file.to_string_lossy(), "batch.json");
                assert!(!args.drain);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_send_requires_file() {
        assert!(Cli::try_parse_from(["courier", "send"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["courier", "--config", "custom.toml", "status"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["courier", "--log-level", "debug", "status"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_drain_max() {
        let cli = Cli::parse_from(["courier", "drain", "--max", "5"]);
        match cli.command {
            Commands::Drain(args) => assert_eq!(args.max, Some(5)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["courier", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["courier", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref args) if args.force));
    }
}
