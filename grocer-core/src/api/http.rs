//! HTTP implementation of [`StoreBackend`].

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StoreBackend;
use crate::error::ApiError;
use crate::models::{CartSnapshot, FavoriteGroup, FavoritesResponse, OrderReceipt, OrderRequest};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody<'a> {
    product_id: &'a str,
}

/// REST client for the storefront backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Creates a client with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the full URL for a path, defaulting the scheme to `http://`.
    fn url(&self, path: &str) -> String {
        let base = if self.base_url.starts_with("http://") || self.base_url.starts_with("https://")
        {
            self.base_url.clone()
        } else {
            format!("http://{}", self.base_url)
        };
        format!("{}{}", base.trim_end_matches('/'), path)
    }

    fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a request and turns non-2xx statuses into [`ApiError::Status`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "Backend responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let bytes = self.send(request).await?.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Sends a mutation; the response body is not trusted and is dropped.
    async fn send_mutation(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }
}

impl StoreBackend for HttpBackend {
    async fn fetch_cart(&self, token: Option<&str>) -> Result<CartSnapshot, ApiError> {
        let request = Self::authorize(self.client.get(self.url("/cart")), token);
        self.send_json(request).await
    }

    async fn add_to_cart(&self, token: &str, product_id: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url("/cart/add"))
            .bearer_auth(token)
            .json(&ProductBody { product_id });
        self.send_mutation(request).await
    }

    async fn remove_from_cart(&self, token: &str, product_id: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url("/cart/remove"))
            .bearer_auth(token)
            .json(&ProductBody { product_id });
        self.send_mutation(request).await
    }

    async fn delete_cart_item(&self, token: &str, product_id: &str) -> Result<(), ApiError> {
        let path = format!("/cart/item/{}", urlencoding::encode(product_id));
        let request = self.client.delete(self.url(&path)).bearer_auth(token);
        self.send_mutation(request).await
    }

    async fn clear_cart(&self, token: &str) -> Result<(), ApiError> {
        let request = self.client.post(self.url("/cart/clear")).bearer_auth(token);
        self.send_mutation(request).await
    }

    async fn fetch_favorites(&self, token: Option<&str>) -> Result<Vec<FavoriteGroup>, ApiError> {
        let request = Self::authorize(self.client.get(self.url("/favorites")), token);
        let response: FavoritesResponse = self.send_json(request).await?;
        Ok(response.into_groups())
    }

    async fn toggle_favorite(&self, token: &str, product_id: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url("/favorites/toggle"))
            .bearer_auth(token)
            .json(&ProductBody { product_id });
        self.send_mutation(request).await
    }

    async fn place_order(
        &self,
        token: &str,
        order: &OrderRequest,
    ) -> Result<OrderReceipt, ApiError> {
        let request = self
            .client
            .post(self.url("/orders"))
            .bearer_auth(token)
            .json(order);
        self.send_json(request).await
    }
}
