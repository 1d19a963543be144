//! Developer-facing failures
//!
//! Nothing here is expected under normal play: both kinds mean the static
//! content budget or the sprite layout is wrong, and the host treats them as
//! fatal.

/// Fatal frame-pipeline errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PongError {
    /// A fixed-capacity frame resource overflowed
    #[error("{what} capacity exceeded ({capacity} slots)")]
    CapacityExceeded {
        what: &'static str,
        capacity: usize,
    },
    /// Programmer error, e.g. a sprite index outside the atlas
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
