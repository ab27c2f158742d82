use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod client;
mod commands;
mod config;

use client::StoreClient;
use commands::{AuthCommand, CartCommand, CheckoutCommand, ConfigCommand, FavoritesCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "grocer")]
#[command(version)]
#[command(about = "A storefront cart client", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// View and change the cart
    Cart(CartCommand),

    /// Manage favorite products
    Favorites(FavoritesCommand),

    /// Place an order for the current cart
    Checkout(CheckoutCommand),

    /// Manage the login token
    Auth(AuthCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grocer=warn,grocer_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Cart(cmd)) => {
            let mut client = StoreClient::from_config(&config)?;
            cmd.run(&mut client).await?;
        }
        Some(Commands::Favorites(cmd)) => {
            let mut client = StoreClient::from_config(&config)?;
            cmd.run(&mut client).await?;
        }
        Some(Commands::Checkout(cmd)) => {
            let mut client = StoreClient::from_config(&config)?;
            cmd.run(&mut client, &config).await?;
        }
        Some(Commands::Auth(cmd)) => {
            cmd.run(&config)?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
