//! Optimistic cart updates.
//!
//! These run before the server has confirmed anything so the UI reacts to a
//! tap immediately. They never fail: an action that does not apply to the
//! current state (decrementing a product that is not in the cart, or
//! incrementing an unknown product without seller context) is a no-op.

use rust_decimal::Decimal;

use crate::models::{CartLineItem, CartState, SellerGroup};

/// What the caller knows about a product that is not in the cart yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerContext {
    pub seller_id: String,
    pub shop_name: String,
    pub unit_price: Decimal,
}

impl SellerContext {
    pub fn new(
        seller_id: impl Into<String>,
        shop_name: impl Into<String>,
        unit_price: Decimal,
    ) -> Self {
        Self {
            seller_id: seller_id.into(),
            shop_name: shop_name.into(),
            unit_price,
        }
    }
}

/// A named, local cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// One more unit. Without seller context only existing lines are bumped.
    Increment {
        product_id: String,
        seller: Option<SellerContext>,
    },
    /// One less unit; the line disappears when it reaches zero.
    Decrement { product_id: String },
    /// Drop the line regardless of quantity.
    RemoveLine { product_id: String },
    /// Empty the cart.
    Clear,
}

impl CartAction {
    pub fn increment(product_id: impl Into<String>) -> Self {
        CartAction::Increment {
            product_id: product_id.into(),
            seller: None,
        }
    }

    pub fn increment_from(product_id: impl Into<String>, seller: SellerContext) -> Self {
        CartAction::Increment {
            product_id: product_id.into(),
            seller: Some(seller),
        }
    }

    pub fn decrement(product_id: impl Into<String>) -> Self {
        CartAction::Decrement {
            product_id: product_id.into(),
        }
    }

    pub fn remove_line(product_id: impl Into<String>) -> Self {
        CartAction::RemoveLine {
            product_id: product_id.into(),
        }
    }

    /// The product this action targets, if any.
    pub fn product_id(&self) -> Option<&str> {
        match self {
            CartAction::Increment { product_id, .. }
            | CartAction::Decrement { product_id }
            | CartAction::RemoveLine { product_id } => Some(product_id),
            CartAction::Clear => None,
        }
    }
}

/// Applies `action` to `state` and returns the new state.
///
/// Seller totals and the cart total are re-derived afterwards. Seller groups
/// emptied by a decrement stay in place until the next reconcile decides
/// whether the seller is still part of the cart.
pub fn apply_optimistic(mut state: CartState, action: &CartAction) -> CartState {
    match action {
        CartAction::Increment {
            product_id,
            seller: Some(ctx),
        } => increment_in_seller(&mut state, product_id, ctx),
        CartAction::Increment {
            product_id,
            seller: None,
        } => {
            if let Some(item) = state
                .sellers
                .iter_mut()
                .find_map(|s| s.item_mut(product_id))
            {
                let next = item.quantity.saturating_add(1);
                set_quantity(item, next);
            }
        }
        CartAction::Decrement { product_id } => decrement(&mut state, product_id),
        CartAction::RemoveLine { product_id } => {
            for seller in &mut state.sellers {
                seller.items.retain(|i| i.product_id() != product_id);
            }
        }
        CartAction::Clear => state.sellers.clear(),
    }
    state.derive_totals();
    state
}

fn increment_in_seller(state: &mut CartState, product_id: &str, ctx: &SellerContext) {
    let index = match state
        .sellers
        .iter()
        .position(|s| s.seller_id == ctx.seller_id)
    {
        Some(index) => index,
        None => {
            state
                .sellers
                .push(SellerGroup::new(&ctx.seller_id, &ctx.shop_name));
            state.sellers.len() - 1
        }
    };

    let Some(seller) = state.sellers.get_mut(index) else {
        return;
    };
    match seller.item_mut(product_id) {
        Some(item) => {
            let next = item.quantity.saturating_add(1);
            set_quantity(item, next);
        }
        None => seller
            .items
            .push(CartLineItem::new(product_id, 1, ctx.unit_price)),
    }
}

fn decrement(state: &mut CartState, product_id: &str) {
    for seller in &mut state.sellers {
        let Some(pos) = seller
            .items
            .iter()
            .position(|i| i.product_id() == product_id)
        else {
            continue;
        };
        if seller.items[pos].quantity <= 1 {
            seller.items.remove(pos);
        } else {
            let item = &mut seller.items[pos];
            let next = item.quantity - 1;
            set_quantity(item, next);
        }
        return;
    }
}

/// Sets the quantity and recomputes the line total from the unit price.
///
/// When no unit price can be derived, or the product overflows, the total is
/// left for the server.
fn set_quantity(item: &mut CartLineItem, quantity: u32) {
    if let Some(unit) = item.unit_price() {
        match unit.checked_mul(Decimal::from(quantity)) {
            Some(total) => item.total = total,
            None => tracing::warn!(
                product = %item.product_id(),
                %unit,
                quantity,
                "Line total overflowed; keeping the previous total"
            ),
        }
    }
    item.quantity = quantity;
}
