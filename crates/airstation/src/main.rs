mod cli;
mod handlers;
mod utils;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::handlers::{handle_device, handle_params};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Command::Version => {
            println!("airstation {}", env!("CARGO_PKG_VERSION"));
            println!("airstation-core {}", airstation_core::VERSION);
        }

        Command::Params => handle_params(),

        _ => {
            if let Err(e) = handle_device(cli) {
                error!(error = %e, "command failed");
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
