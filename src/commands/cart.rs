use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use grocer_core::{CartSnapshot, CartState, FetchOutcome, MutationOutcome, SellerContext};
use rust_decimal::Decimal;
use serde::Serialize;

use super::OutputFormat;
use crate::client::{blocked, StoreClient};

#[derive(Args)]
pub struct CartCommand {
    #[command(subcommand)]
    pub command: CartSubcommand,
}

#[derive(Subcommand)]
pub enum CartSubcommand {
    /// Show the cart grouped by seller
    Show {
        /// Show the cached cart without contacting the server
        #[arg(long)]
        offline: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: String,

        /// Seller ID, for products not yet in the cart
        #[arg(long, requires = "price")]
        seller: Option<String>,

        /// Shop name shown until the server responds
        #[arg(long, requires = "seller")]
        shop: Option<String>,

        /// Unit price, for products not yet in the cart
        #[arg(long, requires = "seller")]
        price: Option<Decimal>,
    },

    /// Remove one unit of a product
    Remove {
        /// Product ID
        product_id: String,
    },

    /// Remove a product's line entirely
    Delete {
        /// Product ID
        product_id: String,
    },

    /// Empty the cart
    Clear,
}

/// Cart as printed by `--format json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartView<'a> {
    #[serde(flatten)]
    cart: &'a CartSnapshot,
    item_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    fetched_at: Option<DateTime<Utc>>,
}

impl CartCommand {
    pub async fn run(&self, client: &mut StoreClient) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            CartSubcommand::Show { offline, format } => {
                let mut fetched_at = None;
                if *offline {
                    match client.cached() {
                        Some(cached) => fetched_at = Some(cached.fetched_at),
                        None => {
                            println!("No cached cart. Run `grocer cart show` while online.");
                            return Ok(());
                        }
                    }
                } else if client.session_mut().refresh().await == FetchOutcome::Applied {
                    client.persist()?;
                } else {
                    if let Some(error) = client.session().cart().error() {
                        eprintln!("Could not refresh cart: {}", error);
                    }
                    fetched_at = client.cached().map(|c| c.fetched_at);
                    if let Some(at) = fetched_at {
                        eprintln!("Showing cart cached at {}", at.format("%Y-%m-%d %H:%M UTC"));
                    }
                }

                let cart = client.session().cart();
                match format {
                    OutputFormat::Json => {
                        let snapshot = cart.snapshot();
                        let view = CartView {
                            cart: &snapshot,
                            item_count: cart.total_item_count(),
                            fetched_at,
                        };
                        println!("{}", serde_json::to_string_pretty(&view)?);
                    }
                    OutputFormat::Text => print!("{}", render_cart(cart.state())),
                }
                Ok(())
            }

            CartSubcommand::Add {
                product_id,
                seller,
                shop,
                price,
            } => {
                let context = seller_context(seller.as_deref(), shop.as_deref(), *price);
                let outcome = client
                    .session_mut()
                    .add(product_id, context)
                    .await
                    .map_err(blocked)?;
                report(client, product_id, outcome)
            }

            CartSubcommand::Remove { product_id } => {
                let outcome = client
                    .session_mut()
                    .remove(product_id)
                    .await
                    .map_err(blocked)?;
                report(client, product_id, outcome)
            }

            CartSubcommand::Delete { product_id } => {
                let outcome = client
                    .session_mut()
                    .delete_line(product_id)
                    .await
                    .map_err(blocked)?;
                report(client, product_id, outcome)
            }

            CartSubcommand::Clear => {
                let outcome = client.session_mut().clear().await.map_err(blocked)?;
                client.persist()?;
                match outcome {
                    MutationOutcome::Confirmed => println!("Cart cleared"),
                    MutationOutcome::Failed => fail_notice(client),
                }
                Ok(())
            }
        }
    }
}

fn report(
    client: &mut StoreClient,
    product_id: &str,
    outcome: MutationOutcome,
) -> Result<(), Box<dyn std::error::Error>> {
    client.persist()?;
    match outcome {
        MutationOutcome::Confirmed => {
            let quantity = client.session().cart().quantity_of(product_id);
            if quantity == 0 {
                println!("{} is no longer in the cart", product_id);
            } else {
                println!("{} x{} in cart", product_id, quantity);
            }
            println!(
                "Cart total: {}",
                format_money(client.session().cart().state().total_price)
            );
        }
        MutationOutcome::Failed => fail_notice(client),
    }
    Ok(())
}

fn fail_notice(client: &StoreClient) {
    let reason = client.session().cart().error().unwrap_or("unknown error");
    eprintln!("Could not update cart: {}", reason);
    eprintln!("The cart has been reloaded from the server.");
}

/// Seller details for an optimistic insert; needs both a seller and a price.
fn seller_context(
    seller: Option<&str>,
    shop: Option<&str>,
    price: Option<Decimal>,
) -> Option<SellerContext> {
    let seller = seller?;
    let price = price?;
    Some(SellerContext::new(seller, shop.unwrap_or(seller), price))
}

fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

/// Text table of the cart, one block per seller.
fn render_cart(state: &CartState) -> String {
    if state.is_empty() {
        return "Your cart is empty\n".to_string();
    }

    let mut out = String::new();
    for seller in &state.sellers {
        out.push_str(&format!("{} ({})\n", seller.shop_name, seller.seller_id));
        for item in &seller.items {
            let label = match item.product.name() {
                Some(name) => format!("{} ({})", name, item.product_id()),
                None => item.product_id().to_string(),
            };
            out.push_str(&format!(
                "  {:<40} x{:<4} {:>10}\n",
                label,
                item.quantity,
                format_money(item.total)
            ));
        }
        out.push_str(&format!(
            "  {:<46} {:>10}\n",
            "Subtotal",
            format_money(seller.seller_total)
        ));
    }
    out.push_str(&format!("{}\n", "-".repeat(60)));
    out.push_str(&format!(
        "{:<48} {:>10}\n",
        "Total",
        format_money(state.total_price)
    ));
    out
}
