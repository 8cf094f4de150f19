//! Command-line interface parsing for the treasury bond catalog
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the client and logging configuration used at startup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::{parse_timeout_secs, ClientConfig, ConfigError, LogConfig};
use crate::logging::default_log_path;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// `call` arguments were not a JSON document
    #[error("Invalid tool arguments: {0}")]
    InvalidToolArgs(#[from] serde_json::Error),

    /// `--log-file` was given without a path and no default location exists
    #[error("No default log location available; pass --log-file=PATH")]
    NoDefaultLogPath,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Tesouro Direto treasury bond catalog
#[derive(Parser, Debug)]
#[command(name = "tesouro")]
#[command(about = "Brazilian treasury bond catalog from Tesouro Direto")]
#[command(version)]
pub struct Cli {
    /// Catalog endpoint (overrides TESOURO_API_URL)
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Upstream request timeout in seconds (overrides TESOURO_TIMEOUT_SECS)
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Write logs to a file instead of stderr, optionally at PATH
    ///
    /// Examples:
    ///   tesouro --log-file market            # per-user data directory
    ///   tesouro --log-file=/tmp/t.log market # explicit path
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        require_equals = true,
        global = true
    )]
    pub log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Market opening/closing times and status
    Market,

    /// Detailed data for one bond
    Bond {
        /// Numeric bond code
        code: i64,
    },

    /// Search bonds by reference index and maturity window
    Search {
        /// Reference index (ANY, SELIC, IPCA, PREFIXADO, IGPM or free text)
        #[arg(long)]
        bond_type: Option<String>,
        /// Earliest maturity date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        maturity_after: Option<String>,
        /// Latest maturity date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        maturity_before: Option<String>,
    },

    /// List the market resource and every bond resource
    Resources,

    /// Read a resource by URI
    Read {
        /// e.g. tesourodireto://market or tesourodireto://bond/170
        uri: String,
    },

    /// Describe the available tools
    Tools,

    /// Call a tool by name with JSON arguments
    Call {
        name: String,
        #[arg(default_value = "{}")]
        args: String,
    },

    /// Poll market status through the cache
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 60)]
        interval: u64,
        /// Stop after this many polls
        #[arg(long)]
        count: Option<u64>,
    },
}

impl Command {
    /// Tool name and arguments for commands that map onto a tool
    pub fn as_tool_call(&self) -> Result<Option<(String, Value)>, CliError> {
        let call = match self {
            Command::Market => Some(("market_data".to_string(), json!({}))),
            Command::Bond { code } => Some(("bond_data".to_string(), json!({ "code": code }))),
            Command::Search {
                bond_type,
                maturity_after,
                maturity_before,
            } => Some((
                "search_bonds".to_string(),
                json!({
                    "bondType": bond_type,
                    "maturityAfter": maturity_after,
                    "maturityBefore": maturity_before,
                }),
            )),
            Command::Call { name, args } => Some((name.clone(), serde_json::from_str(args)?)),
            Command::Resources | Command::Read { .. } | Command::Tools | Command::Watch { .. } => {
                None
            }
        };
        Ok(call)
    }
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub client: ClientConfig,
    pub log: LogConfig,
}

impl StartupConfig {
    /// Layers CLI flags over an environment-derived client config
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    /// * `client` - Client config already resolved from the environment
    pub fn from_cli(cli: &Cli, mut client: ClientConfig) -> Result<Self, CliError> {
        if let Some(url) = &cli.api_url {
            client.api_url = url.clone();
        }
        if let Some(raw) = &cli.timeout {
            client.timeout = parse_timeout_secs(raw)?;
        }

        let file = match &cli.log_file {
            None => None,
            Some(None) => Some(default_log_path().ok_or(CliError::NoDefaultLogPath)?),
            Some(Some(path)) => Some(path.clone()),
        };

        Ok(StartupConfig {
            client,
            log: LogConfig {
                level: cli.log_level.clone(),
                file,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_parse_market() {
        let cli = Cli::parse_from(["tesouro", "market"]);
        assert_eq!(cli.command, Command::Market);
        assert!(cli.log_file.is_none());
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_cli_parse_bond_code() {
        let cli = Cli::parse_from(["tesouro", "bond", "170"]);
        assert_eq!(cli.command, Command::Bond { code: 170 });
    }

    #[test]
    fn test_cli_parse_search_flags() {
        let cli = Cli::parse_from([
            "tesouro",
            "search",
            "--bond-type",
            "IPCA",
            "--maturity-after",
            "2029-01-01",
        ]);
        assert_eq!(
            cli.command,
            Command::Search {
                bond_type: Some("IPCA".to_string()),
                maturity_after: Some("2029-01-01".to_string()),
                maturity_before: None,
            }
        );
    }

    #[test]
    fn test_cli_log_file_without_value_does_not_swallow_subcommand() {
        let cli = Cli::parse_from(["tesouro", "--log-file", "market"]);
        assert_eq!(cli.command, Command::Market);
        assert!(matches!(cli.log_file, Some(None)));
    }

    #[test]
    fn test_cli_log_file_with_value() {
        let cli = Cli::parse_from(["tesouro", "--log-file=/tmp/tesouro.log", "tools"]);
        assert_eq!(cli.log_file, Some(Some(PathBuf::from("/tmp/tesouro.log"))));
    }

    #[test]
    fn test_cli_watch_defaults() {
        let cli = Cli::parse_from(["tesouro", "watch"]);
        assert_eq!(
            cli.command,
            Command::Watch {
                interval: 60,
                count: None
            }
        );
    }

    #[test]
    fn test_cli_call_default_args() {
        let cli = Cli::parse_from(["tesouro", "call", "market_data"]);
        let (name, args) = cli.command.as_tool_call().unwrap().unwrap();
        assert_eq!(name, "market_data");
        assert_eq!(args, json!({}));
    }

    #[test]
    fn test_call_with_invalid_json_args() {
        let command = Command::Call {
            name: "bond_data".to_string(),
            args: "{code: 1".to_string(),
        };
        let err = command.as_tool_call().unwrap_err();
        assert!(err.to_string().contains("Invalid tool arguments"));
    }

    #[test]
    fn test_search_maps_to_tool_args() {
        let command = Command::Search {
            bond_type: Some("SELIC".to_string()),
            maturity_after: None,
            maturity_before: Some("2030-12-31".to_string()),
        };
        let (name, args) = command.as_tool_call().unwrap().unwrap();
        assert_eq!(name, "search_bonds");
        assert_eq!(args["bondType"], "SELIC");
        assert!(args["maturityAfter"].is_null());
        assert_eq!(args["maturityBefore"], "2030-12-31");
    }

    #[test]
    fn test_resource_commands_are_not_tools() {
        assert!(Command::Resources.as_tool_call().unwrap().is_none());
        assert!(Command::Tools.as_tool_call().unwrap().is_none());
    }

    #[test]
    fn test_startup_config_overrides_client() {
        let cli = Cli::parse_from([
            "tesouro",
            "--api-url",
            "http://localhost:8080/catalog.json",
            "--timeout",
            "5",
            "market",
        ]);
        let config = StartupConfig::from_cli(&cli, ClientConfig::default()).unwrap();
        assert_eq!(config.client.api_url, "http://localhost:8080/catalog.json");
        assert_eq!(config.client.timeout, Duration::from_secs(5));
        assert!(config.log.file.is_none());
    }

    #[test]
    fn test_startup_config_invalid_timeout() {
        let cli = Cli::parse_from(["tesouro", "--timeout", "never", "market"]);
        let result = StartupConfig::from_cli(&cli, ClientConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_startup_config_explicit_log_file() {
        let cli = Cli::parse_from(["tesouro", "--log-file=/var/tmp/t.log", "market"]);
        let config = StartupConfig::from_cli(&cli, ClientConfig::default()).unwrap();
        assert_eq!(config.log.file, Some(PathBuf::from("/var/tmp/t.log")));
    }
}
