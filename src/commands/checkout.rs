use clap::Args;
use grocer_core::FetchOutcome;

use crate::client::{blocked, StoreClient};
use crate::config::Config;

#[derive(Args)]
pub struct CheckoutCommand {
    /// Delivery address ID (defaults to `default_address` from config)
    #[arg(long)]
    pub address: Option<String>,
}

impl CheckoutCommand {
    pub async fn run(
        &self,
        client: &mut StoreClient,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let address = self
            .address
            .clone()
            .or_else(|| config.default_address.value.clone());

        // The empty-cart check runs against local state, so bring it up to date first.
        if client.session_mut().refresh().await == FetchOutcome::Applied {
            client.persist()?;
        } else {
            tracing::warn!("Checking out against the cached cart");
        }

        let receipt = client
            .session_mut()
            .checkout(address.as_deref())
            .await
            .map_err(blocked)?;

        match receipt {
            Some(receipt) => {
                client.save_snapshot()?;
                println!("Order placed: {}", receipt.order_id);
                if !receipt.status.is_empty() {
                    println!("Status: {}", receipt.status);
                }
                println!("Total: {:.2}", receipt.total_price);
                Ok(())
            }
            None => {
                client.persist()?;
                let reason = client
                    .session()
                    .cart()
                    .error()
                    .unwrap_or("unknown error")
                    .to_string();
                Err(format!("Could not place order: {}", reason).into())
            }
        }
    }
}
