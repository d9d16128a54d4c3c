//! Area2 capture agent CLI
//!
//! Validates developer access and replays recorded input scripts through a
//! session controller.

use anyhow::{bail, Context};
use area2_capture_agent::{
    api::{AccessValidator, DevAccessClient},
    config::{Config, CredentialsConfig},
    session::EventScript,
    A2Action, CaptureProvider, VERSION,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "a2-capture")]
#[command(author = "Area2")]
#[command(version = VERSION)]
#[command(about = "Typing telemetry capture for Area2 neuroprofiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a developer access key against the dev-access service
    Validate {
        /// Key to check (defaults to the configured key)
        #[arg(long)]
        key: Option<String>,
    },

    /// Replay a recorded event script and submit or finalize the session
    Replay {
        /// JSON script: {"platform": "...", "events": [...]}
        script: PathBuf,

        /// User id sent with the submission
        #[arg(long, default_value = "")]
        user: String,

        /// Bearer token sent with the submission
        #[arg(long, default_value = "")]
        token: String,

        /// Action to request (default, compare, summary, trends, chatbot)
        #[arg(long, default_value = "default")]
        action: A2Action,

        /// Finalize locally and print the record instead of submitting it
        #[arg(long)]
        local: bool,
    },

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { key } => cmd_validate(key).await,
        Commands::Replay {
            script,
            user,
            token,
            action,
            local,
        } => cmd_replay(&script, &user, &token, action, local).await,
        Commands::Config => cmd_config(),
    }
}

async fn cmd_validate(key: Option<String>) -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let Some(key) = key.or_else(|| config.credentials.map(|c| c.api_key)) else {
        bail!("No access key given and none configured");
    };

    let client = DevAccessClient::new(config.devkey_base_url);
    let response = client.validate_dev_access_key(&key).await;
    if response.ok {
        println!("Access key accepted");
        Ok(())
    } else {
        bail!(
            "Access key rejected: {}",
            response.error.unwrap_or_else(|| "unknown reason".to_string())
        )
    }
}

async fn cmd_replay(
    script_path: &Path,
    user: &str,
    token: &str,
    action: A2Action,
    local: bool,
) -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let content = std::fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read {}", script_path.display()))?;
    let script: EventScript =
        serde_json::from_str(&content).context("Script is not a valid event script")?;
    let platform = script.platform;
    let events = script.into_events().context("Script contains invalid events")?;

    let provider = CaptureProvider::initialize(config).await;
    if !provider.can_access() {
        eprintln!("Warning: capture is not allowed; events will be ignored");
    }

    let session = provider.session_for(Some(platform));
    for event in &events {
        session.process_event(event);
    }
    tracing::info!(platform = %platform, events = events.len(), "Script replayed");

    if local {
        match session.end_typing_session() {
            Ok(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
            Err(err) => bail!("{}: {}", err.error, err.message),
        }
        return Ok(());
    }

    let result = session.submit(user, token, action).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    if let Some(err) = result.error() {
        bail!("{}: {}", err.error, err.message);
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(credentials) = config.credentials.as_mut() {
        *credentials = CredentialsConfig {
            api_key: mask(&credentials.api_key),
        };
    }

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!("App context: {}", config.app_context());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}****")
}
