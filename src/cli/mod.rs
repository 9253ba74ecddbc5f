//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, command input,
//! and the application runners.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod presenter;
pub mod signals;

// Re-export commonly used types
pub use app::{run_check, run_interview, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, InterviewOptions, RunArgs};
pub use presenter::Presenter;
pub use signals::{parse_command, CommandSource, InterviewCommand};
