//! datastudio-metadata - command line entry point.
//!
//! Generated SQL and JSON go to stdout; logs go to stderr.

use datastudio_metadata::commands;
use datastudio_metadata::config::Config;
use datastudio_metadata::driver::DriverRegistry;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() {
    let config = Config::parse_args();
    init_tracing(&config);

    debug!(version = env!("CARGO_PKG_VERSION"), "Starting datastudio-metadata");

    let registry = DriverRegistry::with_defaults();
    match commands::run(&config, &registry).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Hint: {}", suggestion);
            }
            std::process::exit(1);
        }
    }
}
