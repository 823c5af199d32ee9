//! The abstract state-store contract.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::StoreError;

/// A message delivered to a pattern subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubSubMessage {
    /// The concrete channel the message was published on.
    pub channel: String,
    /// The payload, unchanged from `publish`.
    pub payload: String,
}

/// A live pattern subscription.
///
/// Messages published on any matching channel arrive in publish order
/// per channel. Dropping the subscription unsubscribes.
pub struct Subscription {
    pattern: String,
    receiver: mpsc::UnboundedReceiver<PubSubMessage>,
}

impl Subscription {
    pub(crate) fn new(
        pattern: String,
        receiver: mpsc::UnboundedReceiver<PubSubMessage>,
    ) -> Self {
        Self { pattern, receiver }
    }

    /// The pattern this subscription was created with.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The next delivered message, or `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<PubSubMessage> {
        self.receiver.recv().await
    }
}

/// The key-value store the server runs against.
///
/// Implementations are cheap-to-clone handles onto shared state.
/// Every operation may suspend; callers must not hold locks across
/// these calls.
pub trait StateStore: Clone + Send + Sync + 'static {
    /// Reads a string record. Expired records read as absent.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Overwrites a string record, with an optional time-to-live.
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a record. Deleting an absent key is not an error.
    fn del(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Adds a member to an unordered set.
    fn sadd(
        &self,
        key: &str,
        member: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes a member from a set.
    fn srem(
        &self,
        key: &str,
        member: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// All members of a set (empty if the set is absent).
    fn smembers(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Merges fields into a hash record.
    fn hset(
        &self,
        key: &str,
        fields: HashMap<String, String>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// All fields of a hash record.
    fn hgetall(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<HashMap<String, String>, StoreError>> + Send;

    /// Fire-and-forget broadcast to every matching subscriber.
    fn publish(
        &self,
        channel: &str,
        payload: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Subscribes to every channel matching `pattern` (`*` wildcards).
    fn subscribe(&self, pattern: &str)
        -> Result<Subscription, StoreError>;
}
