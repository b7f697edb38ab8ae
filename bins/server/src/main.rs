mod cmd;
mod config;
mod error;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::{Cli, Commands};

/// Фильтр логов, если `RUST_LOG` не задан: только крейты сервиса.
const DEFAULT_LOG_FILTER: &str = "tracker_server=info,tracker_api_server=info,event_log=info";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(log_filter()).init();

    let cli = Cli::parse();
    tracing::info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "starting"
    );

    let result = match cli.command {
        Commands::Serve(args) => cmd::serve::run(args).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "tracker-server failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_targets_service_crates() {
        let filter = EnvFilter::new(DEFAULT_LOG_FILTER).to_string();
        for target in ["tracker_server=info", "tracker_api_server=info", "event_log=info"] {
            assert!(filter.contains(target), "{filter} lacks {target}");
        }
    }
}
