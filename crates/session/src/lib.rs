//! Session store — bounded, expiring per-user conversation history.
//!
//! The store is the only shared mutable state in the service, and the
//! orchestrator is its only writer. Two levels of synchronization keep
//! unrelated users independent: an outer `RwLock` guards the key → entry
//! map and is held only long enough to fetch or insert an `Arc` entry,
//! while each entry owns a `Mutex` over its turn list. `last_access` is an
//! atomic epoch-millis value so the TTL sweep can test expiry without
//! taking any per-session lock.
//!
//! Only user and assistant turns are stored; the system turn is rebuilt on
//! every provider call and never persisted.

use chrono::{DateTime, Duration, Utc};
use silvercare_core::Turn;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Max rounds kept per user when not configured otherwise.
pub const DEFAULT_MAX_ROUNDS: usize = 10;
/// Idle hours after which a session is evicted.
pub const DEFAULT_TTL_HOURS: i64 = 24;

struct SessionEntry {
    /// Epoch millis of the last request that touched this session.
    last_access: AtomicI64,
    /// User/assistant turns, oldest first, at most `2 * max_rounds`.
    turns: Mutex<Vec<Turn>>,
}

impl SessionEntry {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_access: AtomicI64::new(now.timestamp_millis()),
            turns: Mutex::new(Vec::new()),
        }
    }
}

/// Process-wide mapping from user key to conversation history.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<SessionEntry>>>,
    max_turns: usize,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(max_rounds: usize, ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_turns: max_rounds * 2,
            ttl,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_MAX_ROUNDS, Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// Fetch the entry for `key`, creating it if absent. The write lock is
    /// taken only on the miss path and never held across a session await.
    async fn entry(&self, key: &str) -> Arc<SessionEntry> {
        if let Some(entry) = self.sessions.read().await.get(key) {
            return entry.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(SessionEntry::new(Utc::now())))
            .clone()
    }

    /// Refresh `last_access`, creating an empty session if the key is new.
    pub async fn touch_or_create(&self, key: &str) {
        let entry = self.entry(key).await;
        entry
            .last_access
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Snapshot of the stored turns, oldest first. Does not refresh the TTL.
    pub async fn history(&self, key: &str) -> Vec<Turn> {
        let entry = match self.sessions.read().await.get(key) {
            Some(entry) => entry.clone(),
            None => return Vec::new(),
        };
        let turns = entry.turns.lock().await;
        turns.clone()
    }

    /// Append a (user, assistant) pair atomically with respect to concurrent
    /// appends and reads on the same key, then trim to the bound by dropping
    /// the oldest turns.
    pub async fn append_exchange(&self, key: &str, user: Turn, assistant: Turn) {
        let entry = self.entry(key).await;
        let mut turns = entry.turns.lock().await;
        turns.push(user);
        turns.push(assistant);
        if turns.len() > self.max_turns {
            let excess = turns.len() - self.max_turns;
            turns.drain(..excess);
        }
        drop(turns);
        entry
            .last_access
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Remove every session idle longer than the TTL. Returns the number
    /// evicted. Runs on the hot path of each request: a single pass over the
    /// map, no per-session locking.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now.timestamp_millis() - self.ttl.num_milliseconds();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|key, entry| {
            let keep = entry.last_access.load(Ordering::Relaxed) >= cutoff;
            if !keep {
                debug!(user = %key, "session expired, evicting");
            }
            keep
        });
        before - sessions.len()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(max_rounds: usize) -> SessionStore {
        SessionStore::new(max_rounds, Duration::hours(24))
    }

    #[tokio::test]
    async fn unknown_key_has_empty_history() {
        let store = store(10);
        assert!(store.history("nobody").await.is_empty());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn touch_creates_empty_session() {
        let store = store(10);
        store.touch_or_create("u1").await;
        assert_eq!(store.len().await, 1);
        assert!(store.history("u1").await.is_empty());
    }

    #[tokio::test]
    async fn append_preserves_order() {
        let store = store(10);
        store.touch_or_create("u1").await;
        store
            .append_exchange("u1", Turn::user("早上好"), Turn::assistant("早上好呀"))
            .await;
        store
            .append_exchange("u1", Turn::user("吃了吗"), Turn::assistant("吃过啦"))
            .await;

        let history = store.history("u1").await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "早上好");
        assert_eq!(history[3].content, "吃过啦");
    }

    #[tokio::test]
    async fn turn_count_never_exceeds_bound() {
        let store = store(2); // bound = 4 turns
        for i in 0..7 {
            store
                .append_exchange(
                    "u1",
                    Turn::user(format!("q{i}")),
                    Turn::assistant(format!("a{i}")),
                )
                .await;
            assert!(store.history("u1").await.len() <= 4);
        }
        let history = store.history("u1").await;
        assert_eq!(history.len(), 4);
        // Oldest pairs dropped, newest kept
        assert_eq!(history[0].content, "q5");
        assert_eq!(history[3].content, "a6");
    }

    #[tokio::test]
    async fn sessions_are_isolated_by_key() {
        let store = store(10);
        store
            .append_exchange("u1", Turn::user("one"), Turn::assistant("1"))
            .await;
        store
            .append_exchange("u2", Turn::user("two"), Turn::assistant("2"))
            .await;
        assert_eq!(store.history("u1").await.len(), 2);
        assert_eq!(store.history("u2").await.len(), 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn sweep_evicts_only_idle_sessions() {
        let store = store(10);
        store
            .append_exchange("idle", Turn::user("hi"), Turn::assistant("hello"))
            .await;

        // Before the TTL elapses the session survives with turns intact.
        let removed = store.sweep_expired(Utc::now() + Duration::hours(23)).await;
        assert_eq!(removed, 0);
        assert_eq!(store.history("idle").await.len(), 2);

        // After the TTL it is gone.
        let removed = store.sweep_expired(Utc::now() + Duration::hours(25)).await;
        assert_eq!(removed, 1);
        assert!(store.history("idle").await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn touch_refreshes_ttl() {
        let store = store(10);
        store.touch_or_create("u1").await;
        let t0 = Utc::now();

        // Touch again "12 hours later" — conceptually; the refresh updates
        // last_access to now, so a sweep at t0+25h only evicts if the last
        // touch is older than 24h.
        store.touch_or_create("u1").await;
        let removed = store.sweep_expired(t0 + Duration::hours(23)).await;
        assert_eq!(removed, 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_lose_nothing() {
        let store = Arc::new(store(100));
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.touch_or_create("shared").await;
                store
                    .append_exchange(
                        "shared",
                        Turn::user(format!("q{i}")),
                        Turn::assistant(format!("a{i}")),
                    )
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let history = store.history("shared").await;
        assert_eq!(history.len(), 64); // 32 pairs, none lost

        // Every pair is adjacent: user turn immediately followed by its answer.
        for pair in history.chunks(2) {
            let q = pair[0].content.trim_start_matches('q');
            let a = pair[1].content.trim_start_matches('a');
            assert_eq!(q, a);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_distinct_keys() {
        let store = Arc::new(store(10));
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("user-{i}");
                store.touch_or_create(&key).await;
                store
                    .append_exchange(&key, Turn::user("hi"), Turn::assistant("hello"))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len().await, 16);
    }
}
