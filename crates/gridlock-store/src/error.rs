//! Error types for the store layer.

/// Errors that can occur against the state store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A record could not be encoded or decoded.
    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store (or a subscription) has been shut down.
    #[error("store closed")]
    Closed,
}
