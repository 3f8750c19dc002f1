//! Corner Shop CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations for the shop schema
//! shop-cli migrate
//!
//! # Show which migrations are applied
//! shop-cli migrate --status
//!
//! # Load products from a YAML file
//! shop-cli seed products -f crates/cli/seed/products.yaml
//! ```
//!
//! Every command reads `DATABASE_URL` (a `.env` file is honored).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Corner Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// List migrations and whether they are applied instead of running them
        #[arg(long)]
        status: bool,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert catalog products from a YAML file
    Products {
        /// Path to the YAML file
        #[arg(short, long, default_value = "crates/cli/seed/products.yaml")]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { status: false } => commands::migrate::run().await?,
        Commands::Migrate { status: true } => commands::migrate::status().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
    }
    Ok(())
}
