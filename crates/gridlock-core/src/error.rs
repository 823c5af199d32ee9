//! Error types for the rules layer.

/// Errors that can occur while applying tetris rules.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The rotation does not fit, even after trying every wall kick
    /// for this piece and rotation transition.
    #[error("rotation blocked: no wall kick fits")]
    RotationBlocked,
}
