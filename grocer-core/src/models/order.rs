//! Checkout request and receipt.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub address_id: String,
}

/// What the backend returns for a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    #[serde(alias = "_id", default, deserialize_with = "lenient::string")]
    pub order_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_price: Decimal,
}
