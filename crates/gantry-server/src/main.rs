//! `gantry-server` binary.

use gantry_config::ConfigLoader;
use gantry_core::telemetry::{init_telemetry, shutdown_telemetry};
use gantry_server::startup::print_banner;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Logging is not up yet, so configuration problems go to stderr.
    let config = match ConfigLoader::from_default_location() {
        Ok(loader) => loader.get().await,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_telemetry(&config.observability) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    print_banner();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.app.environment,
        "Starting Gantry"
    );

    let code = match gantry_server::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server exited with an error");
            ExitCode::FAILURE
        }
    };
    shutdown_telemetry();
    code
}
