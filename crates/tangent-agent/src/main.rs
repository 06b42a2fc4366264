//! # tangent-agent
//!
//! Line-oriented front end for the tangent router: reads messages from stdin,
//! routes them for the current owner, and prints each result bundle as JSON.

#![deny(unsafe_code)]

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tangent_core::constants::VERSION;
use tangent_core::ids::OwnerId;
use tangent_settings::TangentSettings;
use tangent_threads::{ConversationRouter, RouteContext, RouterConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::commands::{Command, HELP};

/// Tangent routing REPL.
#[derive(Parser, Debug)]
#[command(
    name = "tangent-agent",
    version = VERSION,
    about = "Route conversation messages into threads"
)]
struct Cli {
    /// Owner whose messages are routed first.
    #[arg(long, default_value = "local")]
    owner: String,

    /// Settings file (defaults to `~/.tangent/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Maximum live threads per owner (overrides settings if specified).
    #[arg(long)]
    max_active: Option<usize>,
}

fn load_settings(cli: &Cli) -> Result<TangentSettings> {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(tangent_settings::settings_path);
    let mut settings = tangent_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    if let Some(max_active) = cli.max_active {
        settings.capacity.max_active_threads = max_active;
        settings
            .validate()
            .context("Invalid --max-active value")?;
    }
    Ok(settings)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    if settings.logging.json {
        tangent_core::logging::init_json_subscriber(&settings.logging.level);
    } else {
        tangent_core::logging::init_subscriber(&settings.logging.level);
    }

    let router = ConversationRouter::new(RouterConfig::from(&settings));
    let mut owner = OwnerId::from(cli.owner.as_str());
    info!(owner_id = %owner, version = VERSION, "tangent agent ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e} (try :help)");
                continue;
            }
        };

        match command {
            Command::Route(text) => {
                let bundle = router
                    .route_message(&owner, &text, RouteContext::default())
                    .await;
                print_json(&bundle)?;
            }
            Command::Threads => print_json(&router.list_active_threads(&owner))?,
            Command::Transitions(window) => {
                print_json(&router.recent_transitions(&owner, window))?;
            }
            Command::Reconcile => print_json(&router.reconcile(&owner))?,
            Command::Owner(id) => {
                owner = OwnerId::from(id.as_str());
                info!(owner_id = %owner, "switched owner");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Empty => {}
        }
    }

    let swept = router.reconcile_all();
    if !swept.is_empty() {
        info!(owners = swept.len(), "final reconciliation changed threads");
    }
    Ok(())
}
