//! CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};

use crate::domain::recording::Duration;

/// Interview Capture - record video interview answers for AI analysis
#[derive(Parser, Debug)]
#[command(name = "interview-capture")]
#[command(version)]
#[command(about = "Record video interview answers and collect AI feedback")]
#[command(long_about = None)]
pub struct Cli {
    /// Verbose logging (debug level)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Backend base URL
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an interactive interview
    Run(RunArgs),
    /// Check backend health and interview requirements
    Check,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for the `run` subcommand
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Job the interview is for
    #[arg(short = 'j', long = "job", value_name = "ID")]
    pub job_id: String,

    /// Candidature the interview belongs to
    #[arg(short = 'c', long = "candidature", value_name = "ID")]
    pub candidature_id: Option<String>,

    /// Recording cutoff per answer (e.g., 90s, 2m)
    #[arg(short = 'd', long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Allow skipping questions without answering
    #[arg(long)]
    pub allow_skip: bool,

    /// Show desktop notifications
    #[arg(short = 'n', long)]
    pub notify: bool,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Resolved options for an interview run
#[derive(Debug, Clone)]
pub struct InterviewOptions {
    pub job_id: String,
    pub candidature_id: Option<String>,
    pub backend_url: String,
    pub max_duration: Duration,
    pub poll_max_attempts: u32,
    pub poll_interval: Duration,
    pub upload_retries: u32,
    pub upload_backoff: Duration,
    pub allow_skip: bool,
    pub notify: bool,
    pub video_device: String,
    pub audio_source: String,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "backend_url",
    "max_duration",
    "poll_max_attempts",
    "poll_interval",
    "upload_retries",
    "upload_backoff",
    "allow_skip",
    "notify",
    "capture.video_device",
    "capture.audio_source",
    "user.id",
    "user.name",
    "user.email",
    "user.role",
    "user.linkedin",
    "user.token",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
