//! Integration tests for CLI argument handling
//!
//! Runs the binary for argument errors and help output; nothing here reaches
//! the network.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tesouro"))
        .args(args)
        .output()
        .expect("Failed to execute tesouro")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tesouro"), "Help should mention tesouro");
    assert!(stdout.contains("search"), "Help should list the search command");
    assert!(stdout.contains("--log-file"), "Help should mention --log-file");
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_unknown_subcommand_prints_error_and_exits() {
    let output = run_cli(&["portfolio"]);
    assert!(!output.status.success(), "Expected unknown command to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unrecognized") || stderr.contains("invalid"),
        "Should print error message about the command: {}",
        stderr
    );
}

#[test]
fn test_non_numeric_bond_code_is_rejected() {
    let output = run_cli(&["bond", "abc"]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_timeout_fails_before_any_request() {
    let output = run_cli(&["--timeout", "0", "--api-url", "http://127.0.0.1:9/", "market"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("timeout"), "stderr: {}", stderr);
}

#[test]
fn test_tools_command_prints_descriptors_without_network() {
    let output = run_cli(&["--api-url", "http://127.0.0.1:9/", "tools"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("tools output is JSON");
    assert_eq!(value["tools"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_read_unknown_uri_fails_without_network() {
    let output = run_cli(&["--api-url", "http://127.0.0.1:9/", "read", "ftp://nowhere"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Resource not found"), "stderr: {}", stderr);
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use tesouro::cli::{Cli, Command, StartupConfig};
    use tesouro::config::ClientConfig;

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tesouro", "market", "--log-level", "debug"]);
        assert_eq!(cli.command, Command::Market);
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_cli_watch_with_count() {
        let cli = Cli::parse_from(["tesouro", "watch", "--interval", "5", "--count", "3"]);
        assert_eq!(
            cli.command,
            Command::Watch {
                interval: 5,
                count: Some(3)
            }
        );
    }

    #[test]
    fn test_cli_read_uri() {
        let cli = Cli::parse_from(["tesouro", "read", "tesourodireto://bond/2"]);
        assert_eq!(
            cli.command,
            Command::Read {
                uri: "tesourodireto://bond/2".to_string()
            }
        );
    }

    #[test]
    fn test_bond_command_maps_to_bond_data_tool() {
        let cli = Cli::parse_from(["tesouro", "bond", "2"]);
        let (name, args) = cli.command.as_tool_call().unwrap().unwrap();
        assert_eq!(name, "bond_data");
        assert_eq!(args["code"], 2);
    }

    #[test]
    fn test_startup_config_keeps_env_client_without_flags() {
        let cli = Cli::parse_from(["tesouro", "market"]);
        let base = ClientConfig::default();
        let config = StartupConfig::from_cli(&cli, base.clone()).unwrap();
        assert_eq!(config.client.api_url, base.api_url);
        assert_eq!(config.client.timeout, base.timeout);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_startup_config_default_log_file() {
        let cli = Cli::parse_from(["tesouro", "--log-file", "tools"]);
        match StartupConfig::from_cli(&cli, ClientConfig::default()) {
            Ok(config) => {
                let path = config.log.file.expect("log file should be set");
                assert!(path.ends_with("tesouro.log"));
            }
            // No home directory available
            Err(err) => assert!(err.to_string().contains("--log-file=PATH")),
        }
    }
}
