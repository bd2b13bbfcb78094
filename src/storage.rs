use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

// 1. KeyValueStore Contract
/// KeyValueStore
///
/// The abstract contract for the tab-scoped client state (redirect record,
/// nickname hint). Flow components never touch a concrete store; they receive a
/// `StoreState` so the same logic runs against the web shell's per-session
/// stores in production and a plain `MemoryStore` in tests.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// StoreState
///
/// The shared handle type injected into the guard and the hint helpers.
pub type StoreState = Arc<dyn KeyValueStore>;

// 2. The In-Memory Implementation
/// MemoryStore
///
/// A mutex-guarded map. Backs one browser session in the web shell and every
/// unit test.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> StoreState {
        Arc::new(Self::new())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds consistent string pairs.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

// 3. Session Registry (Web Shell)
/// SessionStores
///
/// Maps a browser-session id (the `sid` session cookie) to that session's store.
/// This is what makes the state "tab-scoped" on the server side: it lives as long
/// as the browser session cookie and is never shared between sessions.
///
/// Stores untouched for longer than `idle_ttl` are evicted lazily whenever a
/// session is opened.
pub struct SessionStores {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    idle_ttl: Duration,
}

struct SessionEntry {
    store: Arc<MemoryStore>,
    last_seen: Instant,
}

impl SessionStores {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// open
    ///
    /// Returns the store for `session_id`, creating an empty one on first use and
    /// refreshing its idle timer.
    pub fn open(&self, session_id: &str) -> StoreState {
        let now = Instant::now();
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let idle_ttl = self.idle_ttl;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            id == session_id || now.duration_since(entry.last_seen) < idle_ttl
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle browser-session stores");
        }

        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry {
                store: Arc::new(MemoryStore::new()),
                last_seen: now,
            });
        entry.last_seen = now;
        entry.store.clone() as StoreState
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
