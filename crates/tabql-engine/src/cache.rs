//! Process-wide (really: per-`Session`) keyed store of materialized
//! views pending commit. Canonicalization, not locking, is
//! what keeps two `SELECT`s against the same path sharing one `View`:
//! the cache itself does not lock, because a script is single-threaded.

use indexmap::IndexMap;
use tabql_core::{canonicalize_path, View};

/// Keyed by canonical path, ordered by first insertion so commit writes
/// and `paths()` iteration are deterministic across runs.
type Map = IndexMap<String, View, ahash::RandomState>;

#[derive(Debug, Default)]
pub struct ViewCache {
    views: Map,
}

impl ViewCache {
    pub fn new() -> Self {
        ViewCache::default()
    }

    pub fn get(&self, path: &str) -> Option<&View> {
        self.views.get(&canonicalize_path(path))
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut View> {
        self.views.get_mut(&canonicalize_path(path))
    }

    pub fn set(&mut self, path: &str, view: View) {
        let key = canonicalize_path(path);
        log::trace!("view cache: caching {key}");
        self.views.insert(key, view);
    }

    pub fn exists(&self, path: &str) -> bool {
        self.views.contains_key(&canonicalize_path(path))
    }

    pub fn clear(&mut self) {
        self.views.clear();
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }
}
