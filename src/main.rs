//! Tesouro Direto catalog CLI - query treasury bonds from the command line
//!
//! Every command prints JSON to stdout; logs go to stderr or a log file.

use std::error::Error;
use std::process;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use serde_json::json;
use tracing::error;

use tesouro::cache::SnapshotCache;
use tesouro::catalog::TreasuryCatalog;
use tesouro::cli::{Cli, Command, StartupConfig};
use tesouro::config::{CacheSwitch, ClientConfig};
use tesouro::data::{SnapshotSource, TesouroClient};
use tesouro::logging::init_logging;
use tesouro::projection::{resource_contents_document, resource_list_document, to_pretty_text};
use tesouro::tools::{call_tool, tool_descriptors};
use tesouro::watch::{describe_poll, watch_market};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let startup = StartupConfig::from_cli(&cli, ClientConfig::from_env()?)?;
    init_logging(&startup.log)?;

    let client = TesouroClient::new(&startup.client)?;
    let catalog = TreasuryCatalog::new(SnapshotCache::new(client, CacheSwitch::FromEnv));

    execute(&cli.command, &catalog).await
}

/// Runs one command against the catalog, printing its JSON result
async fn execute<S: SnapshotSource>(
    command: &Command,
    catalog: &TreasuryCatalog<S>,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Resources => {
            let resources = catalog.list_resources().await?;
            println!("{}", to_pretty_text(&resource_list_document(&resources)));
        }
        Command::Read { uri } => {
            let document = catalog.read_resource(uri).await?;
            println!("{}", to_pretty_text(&resource_contents_document(&document)));
        }
        Command::Tools => {
            println!("{}", to_pretty_text(&json!({ "tools": tool_descriptors() })));
        }
        Command::Watch { interval, count } => {
            watch(catalog, Duration::from_secs((*interval).max(1)), *count).await;
        }
        Command::Market | Command::Bond { .. } | Command::Search { .. } | Command::Call { .. } => {
            if let Some((name, args)) = command.as_tool_call()? {
                println!("{}", call_tool(catalog, &name, &args).await?);
            }
        }
    }
    Ok(())
}

/// Polls market status through the cache until `count` polls or Ctrl-C
async fn watch<S: SnapshotSource>(catalog: &TreasuryCatalog<S>, every: Duration, count: Option<u64>) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    watch_market(catalog, every, count, ctrl_c, |outcome| {
        let now = Local::now().format("%H:%M:%S");
        match outcome {
            Ok(read) => println!("{} {}", now, describe_poll(&read)),
            Err(err) => {
                error!("Watch poll failed: {}", err);
                eprintln!("{} fetch failed: {}", now, err);
            }
        }
    })
    .await;
}
