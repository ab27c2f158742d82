//! Favorites: the server's grouped lists, and the derived id set.

use std::collections::HashSet;

use crate::models::FavoriteGroup;

/// Deduplicated set of favorited product ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesSet(HashSet<String>);

impl FavoritesSet {
    /// Builds the set from scratch out of every group.
    pub fn from_groups(groups: &[FavoriteGroup]) -> Self {
        Self(
            groups
                .iter()
                .flat_map(FavoriteGroup::product_ids)
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.0.contains(product_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ids in sorted order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.0.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Memoized [`FavoritesSet`] selector keyed on a revision number.
///
/// The owner bumps the revision whenever the group list changes; the set is
/// rebuilt only when asked for a revision it was not built from, so repeated
/// lookups never walk the groups.
#[derive(Debug, Default)]
pub struct FavoritesSelector {
    revision: Option<u64>,
    output: FavoritesSet,
    rebuilds: usize,
}

impl FavoritesSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, revision: u64, groups: &[FavoriteGroup]) -> &FavoritesSet {
        if self.revision != Some(revision) {
            self.output = FavoritesSet::from_groups(groups);
            self.revision = Some(revision);
            self.rebuilds += 1;
        }
        &self.output
    }

    /// How many times the set has been rebuilt.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }
}

/// The favorites list as last fetched, with its derived id set.
#[derive(Debug, Default)]
pub struct FavoritesStore {
    groups: Vec<FavoriteGroup>,
    revision: u64,
    selector: FavoritesSelector,
    error: Option<String>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[FavoriteGroup] {
        &self.groups
    }

    /// Replaces the list with a fresh server response.
    pub fn replace(&mut self, groups: Vec<FavoriteGroup>) {
        self.groups = groups;
        self.revision = self.revision.wrapping_add(1);
        self.error = None;
    }

    pub fn set(&mut self) -> &FavoritesSet {
        self.selector.select(self.revision, &self.groups)
    }

    pub fn is_favorite(&mut self, product_id: &str) -> bool {
        self.set().contains(product_id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.revision = self.revision.wrapping_add(1);
        self.error = None;
    }
}
