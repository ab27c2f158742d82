//! Grocer Core Library
//!
//! Multi-seller cart state for a storefront client: optimistic local updates,
//! reconciliation against the server's cart, a derived favorites set, and the
//! REST client those are fed from.

pub mod api;
pub mod cart;
pub mod error;
pub mod favorites;
pub mod models;
pub mod session;
pub mod storage;
pub mod token;

pub use api::{HttpBackend, StoreBackend};
pub use cart::{
    apply_optimistic, reconcile, CartAction, CartStore, FetchOutcome, FetchTicket, SellerContext,
};
pub use error::{ApiError, Precondition, StorageError};
pub use favorites::{FavoritesSelector, FavoritesSet, FavoritesStore};
pub use models::{
    CartLineItem, CartSnapshot, CartState, FavoriteEntry, FavoriteGroup, OrderReceipt,
    OrderRequest, Product, ProductRef, SellerGroup,
};
pub use session::{CartSession, MutationOutcome};
pub use storage::{CachedCart, SnapshotCache};
pub use token::{StaticToken, TokenProvider, TokenStore};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
