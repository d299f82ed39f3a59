pub mod chat;
pub mod config;
pub mod run;

use clap::{Parser, Subcommand};

/// TaskSmith turns a short conversation into three actionable tasks.
#[derive(Debug, Parser)]
#[command(name = "tasksmith", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Send a single message and print the reply and any tasks.
    Run {
        /// The message to send.
        message: String,
        /// Session id (defaults to "cli:run").
        #[arg(long, default_value = "cli:run")]
        session: String,
        /// Print the full `{sessionId, tasks, reply}` response as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Interactive chat in the terminal.
    Chat {
        /// Session id (a fresh one is generated when omitted).
        #[arg(long)]
        session: Option<String>,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `TS_CONFIG` (or `config.toml`
/// by default). A missing file means all defaults. Returns the parsed
/// [`Config`](ts_domain::config::Config) and the path that was used.
pub fn load_config() -> anyhow::Result<(ts_domain::config::Config, String)> {
    let config_path = std::env::var("TS_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_config_from(config_path: &str) -> anyhow::Result<ts_domain::config::Config> {
    if !std::path::Path::new(config_path).exists() {
        return Ok(ts_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))
}
