use clap::{Args, Subcommand};
use grocer_core::MutationOutcome;

use super::OutputFormat;
use crate::client::{blocked, StoreClient};

#[derive(Args)]
pub struct FavoritesCommand {
    #[command(subcommand)]
    pub command: FavoritesSubcommand,
}

#[derive(Subcommand)]
pub enum FavoritesSubcommand {
    /// List favorite product IDs
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add or remove a product from favorites
    Toggle {
        /// Product ID
        product_id: String,
    },
}

impl FavoritesCommand {
    pub async fn run(&self, client: &mut StoreClient) -> Result<(), Box<dyn std::error::Error>> {
        let session = client.session_mut();
        match &self.command {
            FavoritesSubcommand::List { format } => {
                if !session.refresh_favorites().await {
                    let reason = session.favorites_error().unwrap_or("unknown error");
                    return Err(format!("Could not load favorites: {}", reason).into());
                }

                let favorites = session.favorites();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&favorites.sorted())?);
                    }
                    OutputFormat::Text => {
                        if favorites.is_empty() {
                            println!("No favorites yet");
                            return Ok(());
                        }
                        for id in favorites.sorted() {
                            println!("{}", id);
                        }
                        println!("\nTotal: {} favorite(s)", favorites.len());
                    }
                }
                Ok(())
            }

            FavoritesSubcommand::Toggle { product_id } => {
                match session.toggle_favorite(product_id).await.map_err(blocked)? {
                    MutationOutcome::Confirmed => {
                        if session.is_favorite(product_id) {
                            println!("Added {} to favorites", product_id);
                        } else {
                            println!("Removed {} from favorites", product_id);
                        }
                        Ok(())
                    }
                    MutationOutcome::Failed => {
                        let reason = session.favorites_error().unwrap_or("unknown error");
                        Err(format!("Could not update favorites: {}", reason).into())
                    }
                }
            }
        }
    }
}
