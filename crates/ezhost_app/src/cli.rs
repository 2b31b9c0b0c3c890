use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use ezhost_engine::DEFAULT_API_URL;

#[derive(Parser, Debug)]
#[command(name = "ezhost")]
#[command(about = "Upload files, shorten URLs and create pastes on e-z.host")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// API key sent with every request
    #[arg(long, env = "API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the hosting API
    #[arg(long, env = "EZHOST_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// History file (default: ~/.ezhost_history.json)
    #[arg(long, env = "EZHOST_HISTORY", global = true)]
    pub history: Option<PathBuf>,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 10, global = true)]
    pub connect_timeout: u64,

    /// Whole-request timeout in seconds
    #[arg(long, default_value_t = 120, global = true)]
    pub timeout: u64,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Upload a file
    Upload { file: PathBuf },
    /// Shorten a URL
    Shorten { url: String },
    /// Create a paste from text or a file
    Paste(PasteArgs),
    /// Delete one artifact by its deletion URL
    Delete { deletion_url: String },
    /// Show information about an uploaded file
    Info { url: String },
    /// List history with live/expired status
    History,
    /// Delete every live artifact and drop it from history
    Purge {
        /// Confirmation token; prompted for when omitted
        #[arg(long)]
        confirm: Option<String>,
    },
}

impl Command {
    /// Deletion URLs carry their own credential; everything else needs the API key.
    pub fn needs_api_key(&self) -> bool {
        !matches!(self, Command::Delete { .. })
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PasteArgs {
    /// Paste content
    #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,

    /// Read paste content from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[arg(long, default_value = "")]
    pub title: String,

    #[arg(short, long, default_value = "")]
    pub description: String,

    #[arg(short, long, default_value = "")]
    pub language: String,
}
