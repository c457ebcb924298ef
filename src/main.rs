//! OpenForum command-line entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use openforum::cli::{self, Cli};
use openforum::config::Config;
use openforum::{FileStorage, LocalStore};

fn main() -> ExitCode {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();
    let data_dir = args.data_dir.unwrap_or_else(|| config.data_dir.clone());
    tracing::debug!("Storage directory: {:?}", data_dir);

    let store = LocalStore::new(FileStorage::new(data_dir));

    match cli::run(args.command, &store, &config.upload_limits()) {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
