//! Memobase CLI
//!
//! A command-line interface for a Memobase project.

mod commands;

use std::time::Duration;

use clap::{Parser, Subcommand};
use memobase_client::{ClientConfig, MemobaseClient};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Memobase CLI: manage users, blobs and profiles of a Memobase project.
#[derive(Parser, Debug)]
#[command(name = "memobase", version, about)]
struct Cli {
    /// Project URL, without the API prefix.
    #[arg(
        long,
        env = "MEMOBASE_PROJECT_URL",
        default_value = "http://localhost:8019",
        global = true
    )]
    project_url: String,

    /// API key for authentication.
    #[arg(long, env = "MEMOBASE_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "MEMOBASE_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the service is reachable.
    Ping,
    /// Manage users.
    Users(commands::users::UsersArgs),
    /// Insert, fetch, list and delete blobs.
    Blobs(commands::blobs::BlobsArgs),
    /// Process a user's buffered blobs.
    Flush(commands::flush::FlushArgs),
    /// Read or delete derived profiles.
    Profile(commands::profile::ProfileArgs),
    /// Show recent memory events.
    Events(commands::events::EventsArgs),
    /// Print the prompt-ready memory context.
    Context(commands::context::ContextArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::new(&cli.project_url);
    if let Some(ref key) = cli.api_key {
        config = config.with_api_key(key);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let client = MemobaseClient::from_config(&config)?;
    debug!(base_url = %client.base_url(), command = ?cli.command, "memobase cli");

    match cli.command {
        Command::Ping => commands::ping::run(&client).await,
        Command::Users(args) => commands::users::run(&client, &args, &cli.format).await,
        Command::Blobs(args) => commands::blobs::run(&client, &args, &cli.format).await,
        Command::Flush(args) => commands::flush::run(&client, &args).await,
        Command::Profile(args) => commands::profile::run(&client, &args, &cli.format).await,
        Command::Events(args) => commands::events::run(&client, &args, &cli.format).await,
        Command::Context(args) => commands::context::run(&client, &args, &cli.format).await,
    }
}
