//! Favorite groups as returned by `GET /favorites`.
//!
//! The backend returns groups in several shapes. They are decoded into a
//! tagged union here and flattened into product ids by [`FavoriteGroup::product_ids`],
//! so nothing downstream has to care which shape a group arrived in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;
use super::ProductRef;

/// An entry of an `items`-style group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    #[serde(
        rename = "productId",
        default,
        deserialize_with = "lenient::optional"
    )]
    pub product: Option<ProductRef>,
}

/// A favorites group in any of the shapes the backend produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FavoriteGroup {
    /// Both `items` and `products` present
    Mixed {
        #[serde(deserialize_with = "lenient::vec")]
        items: Vec<FavoriteEntry>,
        #[serde(deserialize_with = "lenient::vec")]
        products: Vec<ProductRef>,
    },
    /// `products: [...]` of product objects or ids
    Products {
        #[serde(deserialize_with = "lenient::vec")]
        products: Vec<ProductRef>,
    },
    /// `items: [{ productId }]`
    Items {
        #[serde(deserialize_with = "lenient::vec")]
        items: Vec<FavoriteEntry>,
    },
    /// Anything else; contributes no ids
    Unrecognized(Value),
}

impl FavoriteGroup {
    pub fn items(ids: &[&str]) -> Self {
        FavoriteGroup::Items {
            items: ids
                .iter()
                .map(|id| FavoriteEntry {
                    product: Some(ProductRef::from(*id)),
                })
                .collect(),
        }
    }

    pub fn products(products: Vec<ProductRef>) -> Self {
        FavoriteGroup::Products { products }
    }

    /// Every product id referenced by this group, in order, duplicates kept.
    pub fn product_ids(&self) -> Vec<&str> {
        match self {
            FavoriteGroup::Mixed { items, products } => {
                let mut ids = entry_ids(items);
                ids.extend(products.iter().map(ProductRef::id));
                ids
            }
            FavoriteGroup::Products { products } => products.iter().map(ProductRef::id).collect(),
            FavoriteGroup::Items { items } => entry_ids(items),
            FavoriteGroup::Unrecognized(_) => Vec::new(),
        }
    }
}

fn entry_ids(items: &[FavoriteEntry]) -> Vec<&str> {
    items
        .iter()
        .filter_map(|e| e.product.as_ref().map(ProductRef::id))
        .collect()
}

/// Body of `GET /favorites`: a bare array or wrapped in `{ favorites }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FavoritesResponse {
    List(Vec<FavoriteGroup>),
    Wrapped {
        #[serde(default, deserialize_with = "lenient::vec")]
        favorites: Vec<FavoriteGroup>,
    },
}

impl FavoritesResponse {
    pub fn into_groups(self) -> Vec<FavoriteGroup> {
        match self {
            FavoritesResponse::List(groups) | FavoritesResponse::Wrapped { favorites: groups } => {
                groups
            }
        }
    }
}
