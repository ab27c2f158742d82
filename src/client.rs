//! Storefront client for the CLI.
//!
//! Wraps the core [`CartSession`] with what a one-shot process needs: the
//! snapshot cache that carries the cart between invocations, and the token
//! source picked from the environment or the data directory.

use std::time::Duration;

use grocer_core::{
    ApiError, CachedCart, CartSession, CartStore, FetchOutcome, HttpBackend, Precondition,
    SnapshotCache, StaticToken, StorageError, TokenProvider, TokenStore,
};

use crate::config::Config;

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV: &str = "GROCER_TOKEN";

pub type Session = CartSession<HttpBackend, Box<dyn TokenProvider>>;

/// Where the active token comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    File,
}

/// Errors from setting up or persisting the client.
#[derive(Debug)]
pub enum ClientError {
    Api(ApiError),
    Storage(StorageError),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Api(e) => write!(f, "API error: {}", e),
            ClientError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ApiError> for ClientError {
    fn from(e: ApiError) -> Self {
        ClientError::Api(e)
    }
}

impl From<StorageError> for ClientError {
    fn from(e: StorageError) -> Self {
        ClientError::Storage(e)
    }
}

pub struct StoreClient {
    session: Session,
    cache: SnapshotCache,
    cached: Option<CachedCart>,
}

impl StoreClient {
    /// Builds the backend and session from config, seeding the cart from the
    /// last cached snapshot.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let backend = HttpBackend::with_timeout(
            config.api_url.value.clone(),
            Duration::from_secs(config.timeout_secs.value),
        )?;
        let cache = SnapshotCache::new(&config.data_dir.value);

        let cached = match cache.load() {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("Ignoring unreadable cart cache: {}", e);
                None
            }
        };
        let cart = cached
            .as_ref()
            .map(|c| CartStore::from_snapshot(c.cart.clone()))
            .unwrap_or_default();

        let session = CartSession::new(backend, token_provider(config)).with_cart(cart);

        Ok(Self {
            session,
            cache,
            cached,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// The snapshot the session was seeded from, if any.
    pub fn cached(&self) -> Option<&CachedCart> {
        self.cached.as_ref()
    }

    /// Saves the cart if the last fetch came from the server.
    ///
    /// Returns true if the cache was written.
    pub fn persist(&mut self) -> Result<bool, ClientError> {
        if self.session.last_fetch() != Some(FetchOutcome::Applied) {
            return Ok(false);
        }
        self.save_snapshot()?;
        Ok(true)
    }

    /// Saves the current cart regardless of where it came from.
    pub fn save_snapshot(&mut self) -> Result<(), ClientError> {
        let snapshot = self.session.cart().snapshot();
        self.cached = Some(self.cache.save(&snapshot)?);
        Ok(())
    }

    pub fn clear_cache(&mut self) -> Result<(), ClientError> {
        self.cache.clear()?;
        self.cached = None;
        Ok(())
    }
}

/// Picks the token source: `GROCER_TOKEN` if set and non-blank, otherwise
/// the token file in the data directory.
pub fn token_provider(config: &Config) -> Box<dyn TokenProvider> {
    match env_token() {
        Some(token) => Box::new(StaticToken::new(token)),
        None => Box::new(TokenStore::new(&config.data_dir.value)),
    }
}

/// Which source currently supplies a token, if any.
pub fn token_source(config: &Config) -> Result<Option<TokenSource>, StorageError> {
    if env_token().is_some() {
        return Ok(Some(TokenSource::Environment));
    }
    let stored = TokenStore::new(&config.data_dir.value).load()?;
    Ok(stored.map(|_| TokenSource::File))
}

fn env_token() -> Option<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// What to tell the user when a precondition blocks an action.
pub fn precondition_hint(precondition: Precondition) -> &'static str {
    match precondition {
        Precondition::LoginRequired => "Run `grocer auth login --token <TOKEN>` to sign in.",
        Precondition::EmptyCart => "Add something with `grocer cart add <PRODUCT_ID>` first.",
        Precondition::NoDefaultAddress => {
            "Pass --address <ID> or set default_address in the config file."
        }
    }
}

/// Turns a blocked action into the error `run()` prints.
pub fn blocked(precondition: Precondition) -> Box<dyn std::error::Error> {
    format!("{}. {}", precondition, precondition_hint(precondition)).into()
}
