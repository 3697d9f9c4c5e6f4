mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod models;
mod settings;
mod stores;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import { file } => cli::import::run(&file),
        Commands::Transactions => cli::transactions::list(),
        Commands::Categories => cli::categories::list(),
    };

    if let Err(e) = result {
        tracing::debug!("command failed: {e:?}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
