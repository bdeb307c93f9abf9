//! Inventory CLI - Database migrations, seeding and development tokens.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! inventory-cli migrate
//!
//! # Load categories, collections and products from YAML
//! inventory-cli seed seeds/catalog.yaml
//!
//! # Mint a bearer token for local testing
//! inventory-cli token --sub user-1 --email dev@example.com --role authenticated
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "inventory-cli")]
#[command(author, version, about = "Inventory API tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the seed file
        file: String,
    },
    /// Print a signed bearer token for local testing
    Token {
        /// Subject (user id) claim
        #[arg(long)]
        sub: String,

        /// Email claim
        #[arg(long)]
        email: String,

        /// Optional role claim
        #[arg(long)]
        role: Option<String>,

        /// Lifetime in minutes
        #[arg(long, default_value_t = 60)]
        ttl_minutes: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory_cli=info,inventory_api=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Token {
            sub,
            email,
            role,
            ttl_minutes,
        } => commands::token::run(&sub, &email, role.as_deref(), ttl_minutes)?,
    }
    Ok(())
}
