//! The storefront REST backend.
//!
//! [`StoreBackend`] is the contract the session consumes; [`HttpBackend`]
//! implements it over HTTP with bearer authentication.

mod backend;
mod http;

pub use backend::StoreBackend;
pub use http::HttpBackend;
