use clap::{Args, Subcommand};
use grocer_core::TokenStore;
use std::io::{self, Write};

use crate::client::{token_source, StoreClient, TokenSource, TOKEN_ENV};
use crate::config::Config;

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand)]
pub enum AuthSubcommand {
    /// Store a bearer token for authenticated requests
    Login {
        /// Token issued by the storefront (prompted for if omitted)
        #[arg(long)]
        token: Option<String>,
    },

    /// Forget the stored token and cached cart
    Logout,

    /// Show whether a token is available
    Status,
}

impl AuthCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let store = TokenStore::new(&config.data_dir.value);
        match &self.command {
            AuthSubcommand::Login { token } => {
                let token = match token {
                    Some(token) => token.clone(),
                    None => {
                        print!("Token: ");
                        io::stdout().flush()?;
                        let mut input = String::new();
                        io::stdin().read_line(&mut input)?;
                        input
                    }
                };
                let token = token.trim();
                if token.is_empty() {
                    return Err("Token cannot be empty".into());
                }

                store.save(token)?;
                println!("Token saved to {}", store.path().display());
                if std::env::var(TOKEN_ENV).is_ok() {
                    println!("Note: {} is set and takes precedence", TOKEN_ENV);
                }
                Ok(())
            }

            AuthSubcommand::Logout => {
                let mut client = StoreClient::from_config(config)?;
                client.session_mut().logout();
                client.clear_cache()?;

                if store.clear()? {
                    println!("Logged out");
                } else {
                    println!("Not logged in");
                }
                Ok(())
            }

            AuthSubcommand::Status => {
                match token_source(config)? {
                    Some(TokenSource::Environment) => {
                        println!("Logged in (token from {})", TOKEN_ENV)
                    }
                    Some(TokenSource::File) => {
                        println!("Logged in (token from {})", store.path().display())
                    }
                    None => println!("Not logged in"),
                }
                Ok(())
            }
        }
    }
}
