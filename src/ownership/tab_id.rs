//=========================================================================
// Tab Identity
//=========================================================================
//
// Opaque per-tab identity, generated once and persisted in a
// session-scoped store so it survives re-initialization within the same
// tab's lifetime. Never shared between tabs.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;

use log::debug;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::message::now_millis;

//=== Constants ===========================================================

/// Storage key under which the identity is persisted.
pub const TAB_ID_KEY: &str = "governor.tab_id";

/// Length of the random suffix.
const SUFFIX_LEN: usize = 8;

//=== SessionStore ========================================================

/// Session-scoped string key/value storage.
///
/// Implementations are scoped to one tab's lifetime: values persist
/// across re-initialization within the tab but are never visible to
/// sibling tabs.
pub trait SessionStore {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);
}

/// Trivial in-memory [`SessionStore`], the default for embedders without
/// platform-backed session storage (and for tests).
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }
}

//=== TabId ===============================================================

/// Opaque identity of one tab; compared only for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    /// Generates a fresh identity (`tab-<millis>-<8 alphanumeric>`).
    pub fn generate() -> Self {
        let millis = now_millis();
        let suffix: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect();

        Self(format!("tab-{}-{}", millis, suffix))
    }

    /// Returns the identity stored in `store`, generating and persisting
    /// a fresh one on first use.
    pub fn load_or_generate(store: &mut dyn SessionStore) -> Self {
        if let Some(existing) = store.get(TAB_ID_KEY) {
            if !existing.is_empty() {
                debug!(target: "governor::ownership", "reusing tab identity {}", existing);
                return Self(existing);
            }
        }

        let id = Self::generate();
        store.set(TAB_ID_KEY, id.as_str());
        debug!(target: "governor::ownership", "generated tab identity {}", id);
        id
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for TabId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_the_expected_shape() {
        let id = TabId::generate();
        let parts: Vec<&str> = id.as_str().splitn(3, '-').collect();

        assert_eq!(parts[0], "tab");
        assert!(parts[1].parse::<u64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(TabId::generate(), TabId::generate());
    }

    #[test]
    fn load_or_generate_persists_and_reuses() {
        let mut store = MemorySessionStore::new();

        let first = TabId::load_or_generate(&mut store);
        let second = TabId::load_or_generate(&mut store);

        assert_eq!(first, second);
        assert_eq!(store.get(TAB_ID_KEY).as_deref(), Some(first.as_str()));
    }

    #[test]
    fn empty_stored_value_is_regenerated() {
        let mut store = MemorySessionStore::new();
        store.set(TAB_ID_KEY, "");

        let id = TabId::load_or_generate(&mut store);

        assert!(!id.as_str().is_empty());
        assert_eq!(store.get(TAB_ID_KEY).as_deref(), Some(id.as_str()));
    }

    #[test]
    fn distinct_stores_yield_distinct_identities() {
        let mut a = MemorySessionStore::new();
        let mut b = MemorySessionStore::new();

        assert_ne!(
            TabId::load_or_generate(&mut a),
            TabId::load_or_generate(&mut b)
        );
    }

    #[test]
    fn serializes_transparently() {
        let id = TabId::from("tab-1-abc");

        assert_eq!(serde_json::to_string(&id).unwrap(), "\"tab-1-abc\"");
        let back: TabId = serde_json::from_str("\"tab-1-abc\"").unwrap();
        assert_eq!(back, id);
    }
}
