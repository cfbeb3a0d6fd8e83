//! todoctl CLI - Todo API server and data maintenance
//!
//! This is the main entry point for the todoctl command-line tool, which provides:
//! - The REST API server (`serve`)
//! - Seeding from a JSON file (`seed`)
//! - Wiping the collection (`clear`)
//! - Bulk fixture generation for load testing (`generate`)
//! - A statistics summary (`stats`)
//!
//! Every command talks to the backend selected by `--backend` / `TODO_BACKEND`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use todoctl_core::store::{DEFAULT_DATA_FILE, DEFAULT_MONGO_URI};
use todoctl_core::StoreConfig;

mod commands;
mod tracing_setup;
mod ui;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "todoctl",
    author,
    version,
    about = "Todo REST API with MongoDB or JSON file storage",
    long_about = "Serve a small todo REST API backed by MongoDB or a local JSON file, \
                  and seed, clear, generate or summarize its data."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress progress bars (for scripts and CI)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Replace all todos with the contents of a seed file
    Seed(commands::data::SeedArgs),
    /// Delete every todo
    Clear,
    /// Replace all todos with generated fixtures
    Generate(commands::data::GenerateArgs),
    /// Print a statistics summary
    Stats,
}

/// Storage backend kind
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// MongoDB document store
    #[value(alias = "mongodb")]
    Mongo,
    /// Single JSON file on local disk
    File,
}

/// Backend selection shared by every command
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Storage backend
    #[arg(long, env = "TODO_BACKEND", value_enum, default_value_t = Backend::Mongo, global = true)]
    pub backend: Backend,

    /// MongoDB connection string (used with --backend mongo)
    #[arg(
        long,
        env = "MONGO_URI",
        default_value = DEFAULT_MONGO_URI,
        hide_env_values = true,
        global = true
    )]
    pub mongo_uri: String,

    /// JSON data file (used with --backend file)
    #[arg(long, env = "TODO_DATA_FILE", default_value = DEFAULT_DATA_FILE, global = true)]
    pub data_file: PathBuf,
}

impl StoreArgs {
    pub fn store_config(&self) -> StoreConfig {
        match self.backend {
            Backend::Mongo => StoreConfig::mongo(self.mongo_uri.clone()),
            Backend::File => StoreConfig::file(self.data_file.clone()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env fallbacks
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    init_tracing(&TracingConfig { debug: cli.debug }).ok();
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
    ui::init_quiet_mode(cli.quiet);

    let config = cli.store.store_config();
    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &config).await?,
        Commands::Seed(args) => commands::run_seed(args, &config).await?,
        Commands::Clear => commands::run_clear(&config).await?,
        Commands::Generate(args) => commands::run_generate(args, &config).await?,
        Commands::Stats => commands::run_stats(&config).await?,
    }
    Ok(())
}
