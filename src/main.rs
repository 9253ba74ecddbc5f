//! Interview Capture CLI entry point

use std::process::ExitCode;

use clap::Parser;

use interview_capture::cli::{
    app::{
        cli_config, init_logging, load_merged_config, resolve_options, run_check, run_interview,
        session_from_config, EXIT_ERROR, EXIT_USAGE_ERROR,
    },
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use interview_capture::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let presenter = Presenter::new();

    match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Check => {
            let config = load_merged_config(cli_config(cli.backend_url, None)).await;
            run_check(&config).await
        }
        Commands::Run(args) => {
            let config = load_merged_config(cli_config(cli.backend_url, Some(&args))).await;

            let options = match resolve_options(&config, &args) {
                Ok(o) => o,
                Err(e) => {
                    presenter.error(&e);
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            };
            let session = match session_from_config(&config) {
                Ok(s) => s,
                Err(e) => {
                    presenter.error(&e);
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            };

            run_interview(options, session).await
        }
    }
}
