use crate::error::ApiError;
use crate::models::{CartSnapshot, FavoriteGroup, OrderReceipt, OrderRequest};

/// Operations the storefront backend offers.
///
/// Mutations take the bearer token as a plain `&str`; callers must have
/// checked that one exists. Reads take it optionally so logged-out users can
/// still browse.
pub trait StoreBackend {
    /// `GET /cart`
    async fn fetch_cart(&self, token: Option<&str>) -> Result<CartSnapshot, ApiError>;

    /// `POST /cart/add { productId }`
    async fn add_to_cart(&self, token: &str, product_id: &str) -> Result<(), ApiError>;

    /// `POST /cart/remove { productId }`
    async fn remove_from_cart(&self, token: &str, product_id: &str) -> Result<(), ApiError>;

    /// `DELETE /cart/item/{productId}`
    async fn delete_cart_item(&self, token: &str, product_id: &str) -> Result<(), ApiError>;

    /// `POST /cart/clear`
    async fn clear_cart(&self, token: &str) -> Result<(), ApiError>;

    /// `GET /favorites`
    async fn fetch_favorites(&self, token: Option<&str>) -> Result<Vec<FavoriteGroup>, ApiError>;

    /// `POST /favorites/toggle { productId }`
    async fn toggle_favorite(&self, token: &str, product_id: &str) -> Result<(), ApiError>;

    /// `POST /orders { addressId }`
    async fn place_order(
        &self,
        token: &str,
        order: &OrderRequest,
    ) -> Result<OrderReceipt, ApiError>;
}
