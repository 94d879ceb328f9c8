//! Duplicate suppression state
//!
//! Two disjoint keyed sets live here: one of source URLs checked before any
//! fetch, one of content hashes checked after. Membership is add-only for
//! the lifetime of the process. The store is a plain value owned by the
//! consumer loop; the producer never touches it, so no locking is needed.

use std::collections::HashSet;

/// Check-and-insert dedup sets for URLs and content hashes
#[derive(Debug, Default)]
pub struct DedupStore {
    seen_urls: HashSet<String>,
    seen_hashes: HashSet<String>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` and reports whether it was already known
    ///
    /// When `enabled` is false this is a no-op that never reports a
    /// duplicate and records nothing.
    pub fn check_url(&mut self, url: &str, enabled: bool) -> bool {
        if !enabled {
            return false;
        }
        !self.seen_urls.insert(url.to_string())
    }

    /// Records `hash` and reports whether it was already known
    pub fn check_hash(&mut self, hash: &str, enabled: bool) -> bool {
        if !enabled {
            return false;
        }
        !self.seen_hashes.insert(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_not_duplicate_exactly_once() {
        let mut store = DedupStore::new();

        assert!(!store.check_url("https://example.com/a.png", true));
        assert!(store.check_url("https://example.com/a.png", true));
        assert!(store.check_url("https://example.com/a.png", true));
        assert!(!store.check_url("https://example.com/b.png", true));
    }

    #[test]
    fn test_disabled_never_reports_duplicates() {
        let mut store = DedupStore::new();

        assert!(!store.check_url("https://example.com/a.png", false));
        assert!(!store.check_url("https://example.com/a.png", false));
        assert!(!store.check_hash("deadbeef", false));
        assert!(!store.check_hash("deadbeef", false));
    }

    #[test]
    fn test_disabled_check_does_not_record() {
        let mut store = DedupStore::new();

        assert!(!store.check_url("https://example.com/a.png", false));
        // The disabled check above must not have inserted the key
        assert!(!store.check_url("https://example.com/a.png", true));
        assert!(store.check_url("https://example.com/a.png", true));
    }

    #[test]
    fn test_url_and_hash_sets_are_disjoint() {
        let mut store = DedupStore::new();

        assert!(!store.check_url("samekey", true));
        assert!(!store.check_hash("samekey", true));
        assert!(store.check_url("samekey", true));
        assert!(store.check_hash("samekey", true));
    }
}
