//! CLI entry point for ocean-chat

mod tui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use ocean_chat_client::ApiClient;
use ocean_chat_core::config::{Config, ConfigLoader};
use ocean_chat_core::exchange::{self, Resolution};
use ocean_chat_core::logging::init_logging;
use ocean_chat_core::{Role, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "ocean-chat")]
#[command(about = "Terminal chat client for the ocean-chat backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive chat
    Tui,
    /// Send one message and print the conversation
    Send {
        /// Message to send
        #[arg(short, long)]
        message: String,
    },
    /// List conversations from the backend history
    History,
    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };
    let config = config_loader.load()?;

    let mut logging = config.logging.clone();
    if matches!(cli.command, Commands::Tui) {
        logging.stdout = false;
    }
    let _guard = init_logging(&logging);

    match cli.command {
        Commands::Tui => {
            info!("Starting TUI");
            let api = ApiClient::new(&config.api)?;
            tui::run(Arc::new(api), &config.ui).await?;
        }
        Commands::Send { message } => {
            info!("Sending one-shot message");
            run_send(&config, &message).await?;
        }
        Commands::History => {
            info!("Listing history");
            run_history(&config).await?;
        }
        Commands::Status => {
            run_status(&config_loader, &config)?;
        }
    }

    Ok(())
}

/// Send a single message through the same optimistic/reconcile path as the TUI
async fn run_send(config: &Config, message: &str) -> Result<()> {
    let text = message.trim();
    if text.is_empty() {
        anyhow::bail!("Message must not be empty");
    }

    let api = ApiClient::new(&config.api)?;
    let mut store = SessionStore::initialize(&api).await;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message("Sending…");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let resolution = exchange::send(&mut store, &api, text).await;
    spinner.finish_and_clear();

    match resolution {
        Some(Resolution::Reply(_)) => {
            print_thread(&store);
            Ok(())
        }
        Some(Resolution::Failed(reason)) => {
            error!("Send failed: {}", reason);
            print_thread(&store);
            anyhow::bail!("Failed to get a reply: {}", reason)
        }
        None => anyhow::bail!("No active conversation to send to"),
    }
}

fn print_thread(store: &SessionStore) {
    let Some(conversation) = store.active() else {
        return;
    };
    println!("{}", style(&conversation.title).bold());
    for message in &conversation.messages {
        let label = match message.role {
            Role::User => style("you").cyan().bold(),
            Role::Assistant => style("AI").green().bold(),
        };
        println!("\n[{}]", label);
        println!("{}", message.content);
    }
}

async fn run_history(config: &Config) -> Result<()> {
    let api = ApiClient::new(&config.api)?;
    let store = SessionStore::initialize(&api).await;

    println!("{}", style("Conversations").bold().cyan());
    for summary in store.summaries() {
        let marker = if store.active_id() == Some(summary.id.as_str()) {
            style("*").green()
        } else {
            style(" ").dim()
        };
        println!(
            "{} {}  {}  {}",
            marker,
            style(&summary.id).dim(),
            style(&summary.title).bold(),
            summary.preview
        );
    }
    Ok(())
}

fn run_status(loader: &ConfigLoader, config: &Config) -> Result<()> {
    let api = ApiClient::new(&config.api)?;

    println!("{}", style("Ocean Chat Status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config file: {}", loader.config_path().display());
    let base = if api.base_url().is_empty() {
        style("same-origin".to_string()).dim()
    } else {
        style(api.base_url().to_string()).green()
    };
    println!("  Base URL: {}", base);
    println!("  Proxy target: {}", api.proxy_target());
    println!("  History endpoint: {}", api.resolve(ocean_chat_client::HISTORY_PATH));
    println!("  Send endpoint: {}", api.resolve(ocean_chat_client::SEND_PATH));
    println!("  Timeout: {}s", config.api.timeout_secs);
    println!();

    println!("{}", style("Logging:").bold());
    println!("  Level: {}", config.logging.level);
    println!("  Format: {}", config.logging.format);
    println!("  Directory: {}", config.logging.dir);
    Ok(())
}
