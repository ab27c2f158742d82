//! Multi-seller cart: line items grouped per seller.
//!
//! `CartSnapshot` is the wire shape returned by `GET /cart`. `CartState` is
//! the client-side view built from it, which also carries the `loading`
//! flag the UI renders while a fetch is in flight.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;
use super::ProductRef;

/// Adds two amounts, saturating instead of overflowing.
///
/// Totals come from the server unchecked, so a sum past `Decimal::MAX` is
/// clamped and logged.
pub(crate) fn add_money(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| {
        tracing::warn!(%a, %b, "Cart amount overflowed; saturating");
        a.saturating_add(b)
    })
}

fn sum_money(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, add_money)
}

/// One product line inside a seller group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(rename = "productId")]
    pub product: ProductRef,
    /// Always at least 1 once the line has been through a reconcile
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub quantity: u32,
    /// Price × quantity as computed by the server
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total: Decimal,
}

impl CartLineItem {
    pub fn new(product: impl Into<ProductRef>, quantity: u32, total: Decimal) -> Self {
        Self {
            product: product.into(),
            quantity,
            total,
        }
    }

    pub fn product_id(&self) -> &str {
        self.product.id()
    }

    /// Unit price: the embedded product price, else `total / quantity`.
    pub fn unit_price(&self) -> Option<Decimal> {
        self.product.unit_price().or_else(|| {
            if self.quantity == 0 {
                None
            } else {
                self.total.checked_div(Decimal::from(self.quantity))
            }
        })
    }
}

/// A seller's partition of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerGroup {
    #[serde(default, deserialize_with = "lenient::string")]
    pub seller_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub shop_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub shop_image: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub items: Vec<CartLineItem>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub seller_total: Decimal,
}

impl SellerGroup {
    pub fn new(seller_id: impl Into<String>, shop_name: impl Into<String>) -> Self {
        Self {
            seller_id: seller_id.into(),
            shop_name: shop_name.into(),
            shop_image: None,
            address: None,
            items: Vec::new(),
            seller_total: Decimal::ZERO,
        }
    }

    /// Builder-style helper used when assembling groups by hand.
    pub fn with_item(mut self, item: CartLineItem) -> Self {
        self.items.push(item);
        self.recompute_total();
        self
    }

    pub fn item(&self, product_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    pub fn item_mut(&mut self, product_id: &str) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|i| i.product_id() == product_id)
    }

    /// Sum of the line totals.
    pub fn derived_total(&self) -> Decimal {
        sum_money(self.items.iter().map(|i| i.total))
    }

    pub fn recompute_total(&mut self) {
        self.seller_total = self.derived_total();
    }
}

/// Full cart as returned by `GET /cart`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(default, deserialize_with = "lenient::vec")]
    pub sellers: Vec<SellerGroup>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_price: Decimal,
}

impl CartSnapshot {
    pub fn new(sellers: Vec<SellerGroup>) -> Self {
        let total_price = sum_money(sellers.iter().map(|s| s.seller_total));
        Self {
            sellers,
            total_price,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Client-side cart state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub sellers: Vec<SellerGroup>,
    pub total_price: Decimal,
    /// True while a fetch or mutation is in flight
    pub loading: bool,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no seller holds any line item.
    pub fn is_empty(&self) -> bool {
        self.sellers.iter().all(|s| s.items.is_empty())
    }

    pub fn seller(&self, seller_id: &str) -> Option<&SellerGroup> {
        self.sellers.iter().find(|s| s.seller_id == seller_id)
    }

    /// Iterates every line item across all sellers.
    pub fn lines(&self) -> impl Iterator<Item = (&SellerGroup, &CartLineItem)> {
        self.sellers
            .iter()
            .flat_map(|s| s.items.iter().map(move |i| (s, i)))
    }

    /// Re-derives every seller total and the cart total from line totals.
    pub fn derive_totals(&mut self) {
        for seller in &mut self.sellers {
            seller.recompute_total();
        }
        self.total_price = sum_money(self.sellers.iter().map(|s| s.seller_total));
    }

    /// The state in wire shape, e.g. for caching.
    pub fn to_snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            sellers: self.sellers.clone(),
            total_price: self.total_price,
        }
    }
}
