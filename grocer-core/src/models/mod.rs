mod cart;
mod favorites;
pub mod lenient;
mod order;
mod product;

pub(crate) use cart::add_money;
pub use cart::{CartLineItem, CartSnapshot, CartState, SellerGroup};
pub use favorites::{FavoriteEntry, FavoriteGroup, FavoritesResponse};
pub use order::{OrderReceipt, OrderRequest};
pub use product::{Product, ProductRef};
