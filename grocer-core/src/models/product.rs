//! Product references as they appear inside cart and favorites payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;

/// A product as embedded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProductWire")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unit price, when the backend includes it
    pub price: Option<Decimal>,
    pub image: Option<String>,
}

/// Wire shape of [`Product`]. Some endpoints send `_id`, some `id`, some
/// both; they are kept apart so having both is not a duplicate field.
#[derive(Deserialize)]
struct ProductWire {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    object_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    name: String,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::text")]
    image: Option<String>,
}

impl TryFrom<ProductWire> for Product {
    type Error = String;

    fn try_from(wire: ProductWire) -> Result<Self, Self::Error> {
        let id = wire
            .object_id
            .into_iter()
            .chain(wire.id)
            .find(|id| !id.is_empty())
            .ok_or_else(|| "product has no id".to_string())?;
        Ok(Self {
            id,
            name: wire.name,
            price: wire.price,
            image: wire.image,
        })
    }
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Option<Decimal>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
        }
    }
}

/// Weak reference to a product: either a bare id or an embedded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(String),
    Embedded(Product),
}

impl ProductRef {
    /// The referenced product id, whichever shape the reference has.
    pub fn id(&self) -> &str {
        match self {
            ProductRef::Id(id) => id,
            ProductRef::Embedded(product) => &product.id,
        }
    }

    /// Display name, if the product is embedded and named.
    pub fn name(&self) -> Option<&str> {
        match self {
            ProductRef::Embedded(product) if !product.name.is_empty() => Some(&product.name),
            _ => None,
        }
    }

    /// Unit price, if the product is embedded and priced.
    pub fn unit_price(&self) -> Option<Decimal> {
        match self {
            ProductRef::Id(_) => None,
            ProductRef::Embedded(product) => product.price,
        }
    }
}

impl From<&str> for ProductRef {
    fn from(id: &str) -> Self {
        ProductRef::Id(id.to_string())
    }
}

impl From<String> for ProductRef {
    fn from(id: String) -> Self {
        ProductRef::Id(id)
    }
}

impl From<Product> for ProductRef {
    fn from(product: Product) -> Self {
        ProductRef::Embedded(product)
    }
}
