//! In-process [`StateStore`] implementation.
//!
//! Backs tests and the default binary. All state lives behind plain
//! mutexes — no operation holds a lock across an await point, and
//! pub/sub delivery goes through unbounded channels so `publish`
//! never blocks on slow subscribers.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::trace;

use crate::error::StoreError;
use crate::store::{PubSubMessage, StateStore, Subscription};

#[derive(Debug)]
struct Record {
    value: String,
    expires_at: Option<Instant>,
}

impl Record {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

struct Subscriber {
    pattern: String,
    sender: mpsc::UnboundedSender<PubSubMessage>,
}

#[derive(Default)]
struct Inner {
    strings: Mutex<HashMap<String, Record>>,
    sets: Mutex<HashMap<String, HashSet<String>>>,
    hashes: Mutex<HashMap<String, HashMap<String, String>>>,
    subscribers: Mutex<Vec<Subscriber>>,
}

/// Shared in-memory store. Clones are handles onto the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live pattern subscriptions (test hook).
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().unwrap().len()
    }
}

/// Glob match with `*` matching any run of characters.
fn pattern_matches(pattern: &str, channel: &str) -> bool {
    fn matches(p: &[u8], c: &[u8]) -> bool {
        match (p.first(), c.first()) {
            (None, None) => true,
            (Some(b'*'), _) => {
                matches(&p[1..], c)
                    || (!c.is_empty() && matches(p, &c[1..]))
            }
            (Some(pc), Some(cc)) if pc == cc => {
                matches(&p[1..], &c[1..])
            }
            _ => false,
        }
    }
    matches(pattern.as_bytes(), channel.as_bytes())
}

impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut strings = self.inner.strings.lock().unwrap();
        match strings.get(key) {
            Some(record) if record.is_expired() => {
                strings.remove(key);
                Ok(None)
            }
            Some(record) => Ok(Some(record.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let record = Record {
            value: value.to_string(),
            expires_at: ttl.map(|d| Instant::now() + d),
        };
        self.inner
            .strings
            .lock()
            .unwrap()
            .insert(key.to_string(), record);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        self.inner.strings.lock().unwrap().remove(key);
        Ok(())
    }

    async fn sadd(
        &self,
        key: &str,
        member: &str,
    ) -> Result<(), StoreError> {
        self.inner
            .sets
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn srem(
        &self,
        key: &str,
        member: &str,
    ) -> Result<(), StoreError> {
        let mut sets = self.inner.sets.lock().unwrap();
        if let Some(set) = sets.get_mut(key) {
            set.remove(member);
            if set.is_empty() {
                sets.remove(key);
            }
        }
        Ok(())
    }

    async fn smembers(
        &self,
        key: &str,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self
            .inner
            .sets
            .lock()
            .unwrap()
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn hset(
        &self,
        key: &str,
        fields: HashMap<String, String>,
    ) -> Result<(), StoreError> {
        self.inner
            .hashes
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .extend(fields);
        Ok(())
    }

    async fn hgetall(
        &self,
        key: &str,
    ) -> Result<HashMap<String, String>, StoreError> {
        Ok(self
            .inner
            .hashes
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn publish(
        &self,
        channel: &str,
        payload: &str,
    ) -> Result<(), StoreError> {
        let mut subscribers = self.inner.subscribers.lock().unwrap();
        // Deliver and drop subscribers whose receiver is gone.
        subscribers.retain(|sub| {
            if !pattern_matches(&sub.pattern, channel) {
                return true;
            }
            sub.sender
                .send(PubSubMessage {
                    channel: channel.to_string(),
                    payload: payload.to_string(),
                })
                .is_ok()
        });
        trace!(channel, "published");
        Ok(())
    }

    fn subscribe(
        &self,
        pattern: &str,
    ) -> Result<Subscription, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.inner.subscribers.lock().unwrap().push(Subscriber {
            pattern: pattern.to_string(),
            sender,
        });
        Ok(Subscription::new(pattern.to_string(), receiver))
    }
}
