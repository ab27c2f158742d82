//! Reconciliation of local cart state against a server snapshot.

use crate::models::{
    add_money, CartLineItem, CartSnapshot, CartState, ProductRef, SellerGroup,
};

/// Replaces the cart contents with `snapshot`.
///
/// Last writer wins: any optimistic change in `state` is discarded. Only the
/// `loading` flag is carried over, since it tracks requests rather than
/// contents. Lines with quantity zero are dropped, duplicate product ids
/// inside a seller are merged, and seller and cart totals are re-derived
/// from line totals.
pub fn reconcile(state: CartState, snapshot: CartSnapshot) -> CartState {
    let reported_total = snapshot.total_price;

    let mut next = CartState {
        sellers: snapshot.sellers.into_iter().map(normalize_seller).collect(),
        total_price: reported_total,
        loading: state.loading,
    };
    next.derive_totals();

    if next.total_price != reported_total {
        tracing::warn!(
            reported = %reported_total,
            derived = %next.total_price,
            "Server cart total does not match its line totals"
        );
    }

    next
}

fn normalize_seller(mut seller: SellerGroup) -> SellerGroup {
    let reported_total = seller.seller_total;
    let mut items: Vec<CartLineItem> = Vec::with_capacity(seller.items.len());

    for item in seller.items.drain(..) {
        if item.quantity == 0 {
            continue;
        }
        match items
            .iter_mut()
            .find(|existing| existing.product_id() == item.product_id())
        {
            Some(existing) => {
                tracing::debug!(
                    seller = %seller.seller_id,
                    product = %item.product_id(),
                    "Merging duplicate cart line"
                );
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                existing.total = add_money(existing.total, item.total);
                if matches!(existing.product, ProductRef::Id(_)) {
                    existing.product = item.product;
                }
            }
            None => items.push(item),
        }
    }

    seller.items = items;
    seller.recompute_total();
    if seller.seller_total != reported_total {
        tracing::warn!(
            seller = %seller.seller_id,
            reported = %reported_total,
            derived = %seller.seller_total,
            "Server seller total does not match its line totals"
        );
    }
    seller
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{apply_optimistic, CartAction};
    use crate::models::Product;
    use rust_decimal::Decimal;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn server_cart() -> CartSnapshot {
        serde_json::from_str(
            r#"{
                "sellers": [
                    {"sellerId": "S1", "shopName": "Fresh Farms", "items": [
                        {"productId": "p1", "quantity": 2, "total": 100},
                        {"productId": "p2", "quantity": 0, "total": 0}
                    ], "sellerTotal": 100},
                    {"sellerId": "S2", "shopName": "Corner Store", "items": [
                        {"productId": "p3", "quantity": 1, "total": 20},
                        {"productId": {"_id": "p3", "price": 20}, "quantity": 1, "total": 20}
                    ], "sellerTotal": 40}
                ],
                "totalPrice": 140
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let once = reconcile(CartState::new(), server_cart());
        let twice = reconcile(once.clone(), server_cart());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_zero_quantity_lines_are_dropped() {
        let state = reconcile(CartState::new(), server_cart());
        assert!(state.seller("S1").unwrap().item("p2").is_none());
        assert!(state.lines().all(|(_, item)| item.quantity >= 1));
    }

    #[test]
    fn test_duplicate_lines_are_merged() {
        let state = reconcile(CartState::new(), server_cart());
        let seller = state.seller("S2").unwrap();
        assert_eq!(seller.items.len(), 1);
        let item = seller.item("p3").unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.total, dec(40));
        assert_eq!(item.product.unit_price(), Some(dec(20)));
    }

    #[test]
    fn test_totals_are_derived() {
        let mut snapshot = server_cart();
        snapshot.total_price = dec(999);
        snapshot.sellers[0].seller_total = dec(1);

        let state = reconcile(CartState::new(), snapshot);
        for seller in &state.sellers {
            assert_eq!(
                seller.seller_total,
                seller.items.iter().map(|i| i.total).sum::<Decimal>()
            );
        }
        assert_eq!(
            state.total_price,
            state.sellers.iter().map(|s| s.seller_total).sum::<Decimal>()
        );
        assert_eq!(state.total_price, dec(140));
    }

    #[test]
    fn test_reconcile_wins_over_optimistic_state() {
        let seeded = reconcile(
            CartState::new(),
            CartSnapshot::new(vec![SellerGroup::new("S1", "Fresh Farms")
                .with_item(CartLineItem::new("p1", 2, dec(100)))]),
        );

        let local = apply_optimistic(seeded, &CartAction::decrement("p1"));
        let item = local.seller("S1").unwrap().item("p1").unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.total, dec(50));

        let server: CartSnapshot = serde_json::from_str(
            r#"{"sellers": [{"sellerId": "S1", "items": [], "sellerTotal": 0}], "totalPrice": 0}"#,
        )
        .unwrap();
        let state = reconcile(local, server);
        assert!(state.seller("S1").unwrap().items.is_empty());
        assert_eq!(state.total_price, Decimal::ZERO);
    }

    #[test]
    fn test_loading_flag_is_preserved() {
        let mut state = CartState::new();
        state.loading = true;
        let state = reconcile(state, server_cart());
        assert!(state.loading);
    }

    #[test]
    fn test_embedded_product_survives_merge() {
        let snapshot = CartSnapshot::new(vec![SellerGroup::new("S1", "Fresh Farms")
            .with_item(CartLineItem::new(
                Product::new("p1", "Eggs", Some(dec(50))),
                1,
                dec(50),
            ))
            .with_item(CartLineItem::new("p1", 1, dec(50)))]);
        let state = reconcile(CartState::new(), snapshot);
        let item = state.seller("S1").unwrap().item("p1").unwrap();
        assert_eq!(item.product.name(), Some("Eggs"));
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_extreme_totals_saturate() {
        let snapshot: CartSnapshot = serde_json::from_str(
            r#"{"sellers": [{"sellerId": "S1", "items": [
                {"productId": "p1", "quantity": 1, "total": "79228162514264337593543950335"},
                {"productId": "p1", "quantity": 1, "total": "79228162514264337593543950335"},
                {"productId": "p2", "quantity": 1, "total": "79228162514264337593543950335"}
            ]}, {"sellerId": "S2", "items": [
                {"productId": "p3", "quantity": 1, "total": "79228162514264337593543950335"}
            ]}]}"#,
        )
        .unwrap();

        let state = reconcile(CartState::new(), snapshot);
        let seller = state.seller("S1").unwrap();
        assert_eq!(seller.item("p1").unwrap().quantity, 2);
        assert_eq!(seller.item("p1").unwrap().total, Decimal::MAX);
        assert_eq!(seller.seller_total, Decimal::MAX);
        assert_eq!(state.total_price, Decimal::MAX);
    }

    #[test]
    fn test_line_with_both_id_keys_is_kept() {
        let snapshot: CartSnapshot = serde_json::from_str(
            r#"{"sellers": [{"sellerId": "S1", "items": [
                {"productId": {"_id": "p1", "id": "p1", "name": "Eggs", "price": 50},
                 "quantity": 2, "total": 100}
            ], "sellerTotal": 100}], "totalPrice": 100}"#,
        )
        .unwrap();

        let state = reconcile(CartState::new(), snapshot);
        assert_eq!(state.lines().count(), 1);
        let item = state.seller("S1").unwrap().item("p1").unwrap();
        assert_eq!(item.product.name(), Some("Eggs"));
        assert_eq!(state.total_price, dec(100));
    }
}
