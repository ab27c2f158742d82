//! Bearer token providers.
//!
//! The token itself is issued elsewhere (the login flow is not part of this
//! crate); this module only stores and hands it out.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Source of the bearer token for authenticated calls.
pub trait TokenProvider {
    /// The current token, or `None` if the user is logged out.
    fn token(&self) -> Option<String>;
}

impl<T: TokenProvider + ?Sized> TokenProvider for Box<T> {
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}

impl<T: TokenProvider + ?Sized> TokenProvider for &T {
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}

/// A fixed token, e.g. from an environment variable.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Token persisted as a text file in the data directory.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    const FILENAME: &'static str = "token";

    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(Self::FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored token. A missing or blank file means logged out.
    pub fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(self.path.clone(), e)),
        }
    }

    /// Stores the token, creating the data directory if needed.
    pub fn save(&self, token: &str) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| StorageError::Io(dir.to_path_buf(), e))?;
        }
        fs::write(&self.path, token.trim()).map_err(|e| StorageError::Io(self.path.clone(), e))
    }

    /// Removes the token. Returns true if one was stored.
    pub fn clear(&self) -> Result<bool, StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(self.path.clone(), e)),
        }
    }
}

impl TokenProvider for TokenStore {
    fn token(&self) -> Option<String> {
        match self.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not read token: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_token_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(&dir.path().join("nested"));

        assert_eq!(store.token(), None);

        store.save("  abc123\n").unwrap();
        assert_eq!(store.token(), Some("abc123".to_string()));

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_blank_token_file_means_logged_out() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path());
        std::fs::write(store.path(), "\n").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_static_and_boxed_providers() {
        let boxed: Box<dyn TokenProvider> = Box::new(StaticToken::new("t"));
        assert_eq!(boxed.token(), Some("t".to_string()));
        assert_eq!(StaticToken::none().token(), None);
    }
}
