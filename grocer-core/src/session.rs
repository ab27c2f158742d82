//! The action layer between the UI and the cart.
//!
//! Every user-facing trigger goes through [`CartSession`]: preconditions are
//! checked first, then the optimistic update is applied, the backend is
//! called, and the authoritative cart is fetched again whatever the outcome.
//! Network failures never escape as errors; they set the store's error flag
//! and are reported as [`MutationOutcome::Failed`].

use crate::api::StoreBackend;
use crate::cart::{CartAction, CartStore, FetchOutcome, SellerContext};
use crate::error::{ApiError, Precondition};
use crate::favorites::{FavoritesSet, FavoritesStore};
use crate::models::{FavoriteGroup, OrderReceipt, OrderRequest};
use crate::token::TokenProvider;

/// Whether the server accepted a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Confirmed,
    /// The request failed; the cart has been re-fetched to roll back
    Failed,
}

/// Cart and favorites state bound to a backend and a token source.
#[derive(Debug)]
pub struct CartSession<B, T> {
    backend: B,
    tokens: T,
    cart: CartStore,
    favorites: FavoritesStore,
    last_fetch: Option<FetchOutcome>,
}

impl<B: StoreBackend, T: TokenProvider> CartSession<B, T> {
    pub fn new(backend: B, tokens: T) -> Self {
        Self {
            backend,
            tokens,
            cart: CartStore::new(),
            favorites: FavoritesStore::new(),
            last_fetch: None,
        }
    }

    /// Starts from an existing store, e.g. one seeded from the snapshot cache.
    pub fn with_cart(mut self, cart: CartStore) -> Self {
        self.cart = cart;
        self
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Outcome of the most recent cart fetch, if any has run.
    pub fn last_fetch(&self) -> Option<FetchOutcome> {
        self.last_fetch
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn favorite_groups(&self) -> &[FavoriteGroup] {
        self.favorites.groups()
    }

    pub fn favorites(&mut self) -> &FavoritesSet {
        self.favorites.set()
    }

    pub fn is_favorite(&mut self, product_id: &str) -> bool {
        self.favorites.is_favorite(product_id)
    }

    pub fn favorites_error(&self) -> Option<&str> {
        self.favorites.error()
    }

    /// Focus or pull-to-refresh: fetch the authoritative cart.
    pub async fn refresh(&mut self) -> FetchOutcome {
        self.cart.clear_error();
        self.fetch_cart().await
    }

    /// One more unit of `product_id`.
    ///
    /// Pass `seller` when the product may not be in the cart yet, so the
    /// optimistic update knows where to put it.
    pub async fn add(
        &mut self,
        product_id: &str,
        seller: Option<SellerContext>,
    ) -> Result<MutationOutcome, Precondition> {
        self.apply(CartAction::Increment {
            product_id: product_id.to_string(),
            seller,
        })
        .await
    }

    /// One less unit of `product_id`.
    pub async fn remove(&mut self, product_id: &str) -> Result<MutationOutcome, Precondition> {
        self.apply(CartAction::decrement(product_id)).await
    }

    /// Drops the whole line for `product_id`.
    pub async fn delete_line(&mut self, product_id: &str) -> Result<MutationOutcome, Precondition> {
        self.apply(CartAction::remove_line(product_id)).await
    }

    /// Empties the cart on the server.
    pub async fn clear(&mut self) -> Result<MutationOutcome, Precondition> {
        self.apply(CartAction::Clear).await
    }

    pub async fn refresh_favorites(&mut self) -> bool {
        let token = self.tokens.token();
        match self.backend.fetch_favorites(token.as_deref()).await {
            Ok(groups) => {
                self.favorites.replace(groups);
                true
            }
            Err(e) => {
                tracing::warn!("Favorites fetch failed: {}", e);
                self.favorites.set_error(e.to_string());
                false
            }
        }
    }

    /// Toggles a favorite, then re-fetches the list rather than trusting the
    /// toggle response.
    pub async fn toggle_favorite(
        &mut self,
        product_id: &str,
    ) -> Result<MutationOutcome, Precondition> {
        let token = self.require_token()?;
        let failure = self
            .backend
            .toggle_favorite(&token, product_id)
            .await
            .err()
            .map(|e| e.to_string());

        self.refresh_favorites().await;

        match failure {
            Some(message) => {
                tracing::warn!("Favorite toggle failed: {}", message);
                self.favorites.set_error(message);
                Ok(MutationOutcome::Failed)
            }
            None => Ok(MutationOutcome::Confirmed),
        }
    }

    /// Places an order for the current cart.
    ///
    /// Returns `Ok(None)` when the order request failed; the cart is then
    /// re-fetched and the error flag set. On success the local cart is
    /// cleared.
    pub async fn checkout(
        &mut self,
        address_id: Option<&str>,
    ) -> Result<Option<OrderReceipt>, Precondition> {
        let token = self.require_token()?;
        if self.cart.state().is_empty() {
            return Err(Precondition::EmptyCart);
        }
        let address_id = address_id
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(Precondition::NoDefaultAddress)?;

        self.cart.clear_error();
        self.cart.begin_mutation();
        let order = OrderRequest {
            address_id: address_id.to_string(),
        };
        match self.backend.place_order(&token, &order).await {
            Ok(receipt) => {
                self.cart.end_mutation::<ApiError>(Ok(()));
                tracing::info!(order = %receipt.order_id, "Order placed");
                self.cart.clear();
                Ok(Some(receipt))
            }
            Err(e) => {
                self.cart.end_mutation(Err(e));
                self.fetch_cart().await;
                Ok(None)
            }
        }
    }

    /// Drops all local cart and favorites state.
    pub fn logout(&mut self) {
        self.cart.clear();
        self.favorites.clear();
    }

    fn require_token(&self) -> Result<String, Precondition> {
        self.tokens.token().ok_or(Precondition::LoginRequired)
    }

    async fn apply(&mut self, action: CartAction) -> Result<MutationOutcome, Precondition> {
        let token = self.require_token()?;

        self.cart.clear_error();
        self.cart.dispatch(action.clone());
        self.cart.begin_mutation();
        let result = self.send(&token, &action).await;
        let failure = result.as_ref().err().map(ToString::to_string);
        self.cart.end_mutation(result);

        // Success or failure, the server's cart is the answer.
        self.fetch_cart().await;

        match failure {
            Some(message) => {
                self.cart.set_error(message);
                Ok(MutationOutcome::Failed)
            }
            None => Ok(MutationOutcome::Confirmed),
        }
    }

    async fn send(&self, token: &str, action: &CartAction) -> Result<(), ApiError> {
        match action {
            CartAction::Increment { product_id, .. } => {
                self.backend.add_to_cart(token, product_id).await
            }
            CartAction::Decrement { product_id } => {
                self.backend.remove_from_cart(token, product_id).await
            }
            CartAction::RemoveLine { product_id } => {
                self.backend.delete_cart_item(token, product_id).await
            }
            CartAction::Clear => self.backend.clear_cart(token).await,
        }
    }

    async fn fetch_cart(&mut self) -> FetchOutcome {
        let ticket = self.cart.begin_fetch();
        let token = self.tokens.token();
        let result = self.backend.fetch_cart(token.as_deref()).await;
        let outcome = self.cart.complete_fetch(ticket, result);
        self.last_fetch = Some(outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CartLineItem, CartSnapshot, SellerGroup};
    use crate::token::StaticToken;
    use rust_decimal::Decimal;
    use std::cell::{Cell, RefCell};

    /// In-memory backend with server-side cart semantics.
    #[derive(Debug, Default)]
    struct FakeBackend {
        sellers: RefCell<Vec<SellerGroup>>,
        favorites: RefCell<Vec<String>>,
        calls: RefCell<Vec<String>>,
        fail_mutations: Cell<bool>,
        fail_fetches: Cell<bool>,
        /// (product id, seller id, unit price) the server knows about
        catalog: Vec<(&'static str, &'static str, i64)>,
    }

    impl FakeBackend {
        fn with_catalog() -> Self {
            Self {
                catalog: vec![("p1", "S1", 50), ("p2", "S1", 30), ("p3", "S2", 15)],
                ..Self::default()
            }
        }

        fn unavailable() -> ApiError {
            ApiError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.borrow_mut().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn check_mutation(&self) -> Result<(), ApiError> {
            if self.fail_mutations.get() {
                Err(Self::unavailable())
            } else {
                Ok(())
            }
        }

        fn change(&self, product_id: &str, delta: i64) {
            let Some(&(_, seller_id, price)) =
                self.catalog.iter().find(|(id, _, _)| *id == product_id)
            else {
                return;
            };
            let mut sellers = self.sellers.borrow_mut();
            if !sellers.iter().any(|s| s.seller_id == seller_id) {
                sellers.push(SellerGroup::new(seller_id, format!("Shop {}", seller_id)));
            }
            let Some(seller) = sellers.iter_mut().find(|s| s.seller_id == seller_id) else {
                return;
            };
            let current = seller.item(product_id).map(|i| i.quantity).unwrap_or(0);
            let next = (i64::from(current) + delta).max(0) as u32;
            seller.items.retain(|i| i.product_id() != product_id);
            if next > 0 {
                seller.items.push(CartLineItem::new(
                    product_id,
                    next,
                    Decimal::from(price * i64::from(next)),
                ));
            }
            seller.recompute_total();
        }
    }

    impl StoreBackend for FakeBackend {
        async fn fetch_cart(&self, _token: Option<&str>) -> Result<CartSnapshot, ApiError> {
            self.record("GET /cart");
            if self.fail_fetches.get() {
                return Err(Self::unavailable());
            }
            Ok(CartSnapshot::new(self.sellers.borrow().clone()))
        }

        async fn add_to_cart(&self, _token: &str, product_id: &str) -> Result<(), ApiError> {
            self.record(format!("POST /cart/add {}", product_id));
            self.check_mutation()?;
            self.change(product_id, 1);
            Ok(())
        }

        async fn remove_from_cart(&self, _token: &str, product_id: &str) -> Result<(), ApiError> {
            self.record(format!("POST /cart/remove {}", product_id));
            self.check_mutation()?;
            self.change(product_id, -1);
            Ok(())
        }

        async fn delete_cart_item(&self, _token: &str, product_id: &str) -> Result<(), ApiError> {
            self.record(format!("DELETE /cart/item/{}", product_id));
            self.check_mutation()?;
            self.change(product_id, -1_000);
            Ok(())
        }

        async fn clear_cart(&self, _token: &str) -> Result<(), ApiError> {
            self.record("POST /cart/clear");
            self.check_mutation()?;
            self.sellers.borrow_mut().clear();
            Ok(())
        }

        async fn fetch_favorites(
            &self,
            _token: Option<&str>,
        ) -> Result<Vec<FavoriteGroup>, ApiError> {
            self.record("GET /favorites");
            if self.fail_fetches.get() {
                return Err(Self::unavailable());
            }
            let ids = self.favorites.borrow();
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            Ok(vec![FavoriteGroup::items(&ids)])
        }

        async fn toggle_favorite(&self, _token: &str, product_id: &str) -> Result<(), ApiError> {
            self.record(format!("POST /favorites/toggle {}", product_id));
            self.check_mutation()?;
            let mut favorites = self.favorites.borrow_mut();
            if let Some(pos) = favorites.iter().position(|f| f == product_id) {
                favorites.remove(pos);
            } else {
                favorites.push(product_id.to_string());
            }
            Ok(())
        }

        async fn place_order(
            &self,
            _token: &str,
            order: &OrderRequest,
        ) -> Result<OrderReceipt, ApiError> {
            self.record(format!("POST /orders {}", order.address_id));
            self.check_mutation()?;
            let total = CartSnapshot::new(self.sellers.borrow().clone()).total_price;
            self.sellers.borrow_mut().clear();
            Ok(OrderReceipt {
                order_id: "o-1".to_string(),
                status: "pending".to_string(),
                total_price: total,
            })
        }
    }

    fn logged_in() -> CartSession<FakeBackend, StaticToken> {
        CartSession::new(FakeBackend::with_catalog(), StaticToken::new("secret"))
    }

    #[tokio::test]
    async fn test_add_reconciles_with_server() {
        let mut session = logged_in();

        let outcome = session.add("p1", None).await.unwrap();
        assert_eq!(outcome, MutationOutcome::Confirmed);
        assert_eq!(session.cart().quantity_of("p1"), 1);
        assert_eq!(session.cart().state().total_price, Decimal::from(50));
        assert!(!session.cart().is_loading());
        assert_eq!(
            session.backend().calls(),
            vec!["POST /cart/add p1", "GET /cart"]
        );
    }

    #[tokio::test]
    async fn test_remove_last_unit_drops_line() {
        let mut session = logged_in();
        session.add("p2", None).await.unwrap();
        session.remove("p2").await.unwrap();

        assert_eq!(session.cart().quantity_of("p2"), 0);
        assert!(session.cart().state().lines().next().is_none());
    }

    #[tokio::test]
    async fn test_mutations_without_token_are_blocked() {
        let mut session = CartSession::new(FakeBackend::with_catalog(), StaticToken::none());

        assert_eq!(
            session.add("p1", None).await,
            Err(Precondition::LoginRequired)
        );
        assert_eq!(session.remove("p1").await, Err(Precondition::LoginRequired));
        assert_eq!(session.clear().await, Err(Precondition::LoginRequired));
        assert_eq!(
            session.toggle_favorite("p1").await,
            Err(Precondition::LoginRequired)
        );
        assert!(session.backend().calls().is_empty());
        assert_eq!(session.cart().total_item_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_mutation_rolls_back_by_refetch() {
        let mut session = logged_in();
        session.add("p1", None).await.unwrap();

        session.backend().fail_mutations.set(true);
        let outcome = session.add("p1", None).await.unwrap();

        assert_eq!(outcome, MutationOutcome::Failed);
        assert_eq!(session.cart().quantity_of("p1"), 1);
        assert!(session.cart().error().unwrap().contains("503"));
        assert_eq!(
            session.backend().calls().last().map(String::as_str),
            Some("GET /cart")
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_state() {
        let mut session = logged_in();
        session.add("p3", None).await.unwrap();
        let before = session.cart().state().clone();

        session.backend().fail_fetches.set(true);
        assert_eq!(session.refresh().await, FetchOutcome::Failed);
        assert_eq!(session.cart().state(), &before);
        assert!(session.cart().error().is_some());
        assert_eq!(session.last_fetch(), Some(FetchOutcome::Failed));

        session.backend().fail_fetches.set(false);
        assert_eq!(session.refresh().await, FetchOutcome::Applied);
        assert!(session.cart().error().is_none());
        assert_eq!(session.last_fetch(), Some(FetchOutcome::Applied));
    }

    #[tokio::test]
    async fn test_new_product_with_seller_context() {
        let mut session = logged_in();
        let ctx = SellerContext::new("S2", "Shop S2", Decimal::from(15));
        session.add("p3", Some(ctx)).await.unwrap();

        let seller = session.cart().seller("S2").unwrap();
        assert_eq!(seller.item("p3").unwrap().quantity, 1);
        assert_eq!(seller.seller_total, Decimal::from(15));
    }

    #[tokio::test]
    async fn test_delete_line_and_clear() {
        let mut session = logged_in();
        session.add("p1", None).await.unwrap();
        session.add("p1", None).await.unwrap();
        session.add("p3", None).await.unwrap();

        session.delete_line("p1").await.unwrap();
        assert_eq!(session.cart().quantity_of("p1"), 0);
        assert_eq!(session.cart().quantity_of("p3"), 1);

        session.clear().await.unwrap();
        assert!(session.cart().state().sellers.is_empty());
        assert_eq!(session.cart().state().total_price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_toggle_favorite_refetches() {
        let mut session = logged_in();
        assert!(!session.is_favorite("p1"));

        session.toggle_favorite("p1").await.unwrap();
        assert!(session.is_favorite("p1"));
        assert_eq!(
            session.backend().calls(),
            vec!["POST /favorites/toggle p1", "GET /favorites"]
        );

        session.toggle_favorite("p1").await.unwrap();
        assert!(!session.is_favorite("p1"));
    }

    #[tokio::test]
    async fn test_checkout_preconditions() {
        let mut session = logged_in();
        assert_eq!(
            session.checkout(Some("addr-1")).await,
            Err(Precondition::EmptyCart)
        );

        session.add("p1", None).await.unwrap();
        assert_eq!(
            session.checkout(None).await,
            Err(Precondition::NoDefaultAddress)
        );
        assert_eq!(
            session.checkout(Some("  ")).await,
            Err(Precondition::NoDefaultAddress)
        );

        let mut anonymous = CartSession::new(FakeBackend::with_catalog(), StaticToken::none());
        assert_eq!(
            anonymous.checkout(Some("addr-1")).await,
            Err(Precondition::LoginRequired)
        );
    }

    #[tokio::test]
    async fn test_checkout_clears_cart() {
        let mut session = logged_in();
        session.add("p1", None).await.unwrap();
        session.add("p2", None).await.unwrap();

        let receipt = session.checkout(Some("addr-1")).await.unwrap().unwrap();
        assert_eq!(receipt.total_price, Decimal::from(80));
        assert_eq!(session.cart().total_item_count(), 0);
        assert_eq!(session.cart().state().total_price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_checkout_failure_keeps_cart() {
        let mut session = logged_in();
        session.add("p1", None).await.unwrap();
        session.backend().fail_mutations.set(true);

        assert_eq!(session.checkout(Some("addr-1")).await, Ok(None));
        assert_eq!(session.cart().quantity_of("p1"), 1);
        assert!(session.cart().error().is_some());
    }

    #[tokio::test]
    async fn test_logout_clears_local_state() {
        let mut session = logged_in();
        session.add("p1", None).await.unwrap();
        session.toggle_favorite("p2").await.unwrap();

        session.logout();
        assert_eq!(session.cart().total_item_count(), 0);
        assert!(!session.is_favorite("p2"));
    }
}
