mod auth;
mod cart;
mod checkout;
mod config_cmd;
mod favorites;

use clap::ValueEnum;

pub use auth::AuthCommand;
pub use cart::CartCommand;
pub use checkout::CheckoutCommand;
pub use config_cmd::ConfigCommand;
pub use favorites::FavoritesCommand;

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
