//! Last-known-good cart snapshot on disk.
//!
//! A CLI invocation is short-lived, so the most recent reconciled snapshot is
//! kept as JSON in the data directory. It seeds the store before optimistic
//! updates and lets `cart show --offline` render without the network.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::models::CartSnapshot;

/// A cached snapshot and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedCart {
    pub fetched_at: DateTime<Utc>,
    pub cart: CartSnapshot,
}

/// Reads and writes `cart.json` in the data directory.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    const FILENAME: &'static str = "cart.json";

    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(Self::FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached snapshot.
    ///
    /// Returns `Ok(None)` if nothing has been cached yet.
    pub fn load(&self) -> Result<Option<CachedCart>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StorageError::Corrupt(self.path.clone(), e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(self.path.clone(), e)),
        }
    }

    /// Saves a snapshot stamped with the current time.
    pub fn save(&self, cart: &CartSnapshot) -> Result<CachedCart, StorageError> {
        let cached = CachedCart {
            fetched_at: Utc::now(),
            cart: cart.clone(),
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| StorageError::Io(dir.to_path_buf(), e))?;
        }
        let bytes = serde_json::to_vec_pretty(&cached)
            .map_err(|e| StorageError::Corrupt(self.path.clone(), e))?;
        fs::write(&self.path, bytes).map_err(|e| StorageError::Io(self.path.clone(), e))?;

        Ok(cached)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(self.path.clone(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CartLineItem, Product, SellerGroup};
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(&dir.path().join("data"));

        let cart = CartSnapshot::new(vec![SellerGroup::new("S1", "Fresh Farms").with_item(
            CartLineItem::new(
                Product::new("p1", "Eggs", Some(Decimal::new(2550, 2))),
                2,
                Decimal::new(5100, 2),
            ),
        )]);
        let saved = cache.save(&cart).unwrap();

        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.cart.total_price, Decimal::new(5100, 2));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        std::fs::write(cache.path(), "not json").unwrap();
        assert!(matches!(cache.load(), Err(StorageError::Corrupt(_, _))));

        cache.clear().unwrap();
        assert!(cache.load().unwrap().is_none());
    }
}
