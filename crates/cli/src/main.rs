//! Eko Store CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create the document and session tables
//! eko-cli migrate
//!
//! # Load products from a YAML file (validated like API writes)
//! eko-cli seed products seeds/products.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert validated records from YAML

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use eko_store_api::models::{Customer, Product, Review};

mod commands;

#[derive(Parser)]
#[command(name = "eko-cli")]
#[command(author, version, about = "Eko Store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed a collection from a YAML file
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed products
    Products { file: PathBuf },
    /// Seed customers
    Customers { file: PathBuf },
    /// Seed reviews
    Reviews { file: PathBuf },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::run::<Product>(&file).await?,
            SeedTarget::Customers { file } => commands::seed::run::<Customer>(&file).await?,
            SeedTarget::Reviews { file } => commands::seed::run::<Review>(&file).await?,
        },
    }
    Ok(())
}
