//! Client-side session cache
//!
//! Holds the bearer token between requests. The cache is write-through and
//! dumb: it never inspects the token or its expiry. Staleness is only ever
//! discovered when the server rejects a request, at which point the client
//! clears the cache.

use std::sync::Mutex;

/// Where the client keeps its session token between requests.
///
/// The in-memory store below suits tests and short-lived tools; a GUI or
/// browser-style client would back this with its persistent storage.
pub trait SessionStore: Send + Sync {
    /// Load the cached token, if any
    fn load(&self) -> Option<String>;
    /// Replace the cached token
    fn save(&self, token: &str);
    /// Drop the cached token
    fn clear(&self);
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn save(&self, token: &str) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load(), None);

        store.save("token-a");
        assert_eq!(store.load(), Some("token-a".to_string()));

        store.save("token-b");
        assert_eq!(store.load(), Some("token-b".to_string()));

        store.clear();
        assert_eq!(store.load(), None);
    }
}
