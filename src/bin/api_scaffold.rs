use api_scaffold::cli::{run_cli, Cli};
use api_scaffold::logging::{init_logging, LogConfig};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    log_config.verbose = cli.verbose;
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Warning: {e:#}");
    }

    match run_cli(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
