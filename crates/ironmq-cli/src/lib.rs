//! # IronMQ CLI
//!
//! Command-line interface over the `ironmq` client library.
//!
//! This module provides CLI commands for:
//! - Pushing one or more messages
//! - Fetching messages (text or JSON output)
//! - Deleting messages by id
//! - Clearing a queue

use clap::{Parser, Subcommand};
use ironmq::{
    Client, ClientConfig, ConfigurationError, Message, MessageId, Queue, QueueError,
    ValidationError,
};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const ENV_PREFIX: &str = "IRON_";

// ============================================================================
// CLI Structure
// ============================================================================

/// IronMQ CLI - push, fetch, delete and clear queue messages
#[derive(Parser, Debug)]
#[command(name = "ironmq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Work with IronMQ queues from the command line")]
pub struct Cli {
    /// JSON configuration file (iron.json format)
    #[arg(short, long, env = "IRON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Project id, overrides configuration
    #[arg(long, env = "IRON_PROJECT_ID")]
    pub project_id: Option<String>,

    /// OAuth token, overrides configuration
    #[arg(long, env = "IRON_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Service host, overrides configuration
    #[arg(long)]
    pub host: Option<String>,

    /// Service port, overrides configuration
    #[arg(long)]
    pub port: Option<u16>,

    /// Queue to operate on
    #[arg(short, long)]
    pub queue: String,

    /// Logging level
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Push messages, printing one id per line
    Push {
        /// Message bodies, pushed as a single batch
        #[arg(required = true)]
        bodies: Vec<String>,

        /// Reservation timeout in seconds
        #[arg(long, default_value = "0")]
        timeout: u64,

        /// Delivery delay in seconds
        #[arg(long, default_value = "0")]
        delay: u64,

        /// Expiration in seconds
        #[arg(long, default_value = "0")]
        expires_in: u64,
    },

    /// Fetch messages without deleting them
    Get {
        /// Maximum number of messages, defaults to 100
        #[arg(short = 'n', long)]
        limit: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete messages by id
    Delete {
        /// Message ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Remove every message from the queue
    Clear,
}

/// Output format options
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated id and body, one message per line
    Text,
    /// JSON array
    Json,
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("{0}")]
    Queue(#[from] QueueError),

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        Self::Queue(e.into())
    }
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 1,
            Self::Queue(QueueError::Configuration(_)) => 1,
            Self::Queue(QueueError::Transport(_)) => 2,
            Self::Queue(QueueError::Decode { .. }) | Self::Queue(QueueError::Encode(_)) => 3,
            Self::Queue(QueueError::Validation(_)) => 4,
            Self::InvalidArgument { .. } => 4,
            Self::Io(_) => 5,
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    let config = load_configuration(&cli)?;
    let client = Client::new(config)?;
    let queue = client.queue(&cli.queue)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute_command(cli.command, &queue, &mut out).await
}

/// Initialize logging based on CLI arguments
///
/// `RUST_LOG` takes precedence over `--log-level`. Logs go to stderr so
/// command output on stdout stays machine-readable.
fn initialize_logging(cli: &Cli) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .map_err(|e| CliError::InvalidArgument {
            arg: "log-level".to_string(),
            message: e.to_string(),
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| CliError::InvalidArgument {
        arg: "log-level".to_string(),
        message: format!("failed to initialize logging: {}", e),
    })
}

/// Resolve client configuration from file, environment and flags
///
/// Sources apply in order: the optional file, `IRON_*` variables, then
/// flags.
pub fn load_configuration(cli: &Cli) -> Result<ClientConfig, CliError> {
    let env = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect();
    resolve_configuration(cli, env)
}

/// Resolve configuration with `env` standing in for the process environment
///
/// Flags are written over the matching `IRON_*` entries, so a flag wins
/// over both the variable and the file.
pub fn resolve_configuration(
    cli: &Cli,
    mut env: HashMap<String, String>,
) -> Result<ClientConfig, CliError> {
    let overrides = [
        ("IRON_PROJECT_ID", cli.project_id.clone()),
        ("IRON_TOKEN", cli.token.clone()),
        ("IRON_HOST", cli.host.clone()),
        ("IRON_PORT", cli.port.map(|port| port.to_string())),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            env.insert(key.to_string(), value);
        }
    }

    let config = ClientConfig::load_from(cli.config.as_deref(), Some(env))?;
    debug!(config = ?config, "Resolved configuration");
    Ok(config)
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Message as printed by `get --format json`
#[derive(Debug, Serialize)]
struct MessageOutput<'a> {
    id: Option<&'a str>,
    body: &'a str,
    timeout: u64,
    delay: u64,
    expires_in: u64,
}

impl<'a> From<&'a Message> for MessageOutput<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            id: message.id().map(MessageId::as_str),
            body: &message.body,
            timeout: message.timeout,
            delay: message.delay,
            expires_in: message.expires_in,
        }
    }
}

/// Run one command against a queue, writing results to `out`
pub async fn execute_command(
    command: Commands,
    queue: &Queue,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Commands::Push {
            bodies,
            timeout,
            delay,
            expires_in,
        } => {
            info!(queue = %queue.name(), count = bodies.len(), "Pushing messages");
            let messages: Vec<Message> = bodies
                .into_iter()
                .map(|body| {
                    Message::new(body)
                        .with_timeout(timeout)
                        .with_delay(delay)
                        .with_expires_in(expires_in)
                })
                .collect();

            for id in queue.push_messages(&messages).await? {
                writeln!(out, "{}", id)?;
            }
        }
        Commands::Get { limit, format } => {
            let messages = match limit {
                Some(limit) => queue.get_messages(limit).await?,
                None => queue.get().await?,
            };
            info!(queue = %queue.name(), count = messages.len(), "Fetched messages");

            match format {
                OutputFormat::Text => {
                    for message in &messages {
                        let id = message.id().map(MessageId::as_str).unwrap_or("-");
                        writeln!(out, "{}\t{}", id, message.body)?;
                    }
                }
                OutputFormat::Json => {
                    let output: Vec<MessageOutput<'_>> =
                        messages.iter().map(MessageOutput::from).collect();
                    serde_json::to_writer_pretty(&mut *out, &output).map_err(|e| {
                        if e.is_io() {
                            CliError::Io(e.into())
                        } else {
                            CliError::Queue(QueueError::Encode(e))
                        }
                    })?;
                    writeln!(out)?;
                }
            }
        }
        Commands::Delete { ids } => {
            for id in ids {
                let id: MessageId = id.parse()?;
                queue.delete_message(&id).await?;
                info!(queue = %queue.name(), message_id = %id, "Deleted message");
            }
        }
        Commands::Clear => {
            queue.clear().await?;
            info!(queue = %queue.name(), "Cleared queue");
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
