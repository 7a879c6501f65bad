//! Error type for arrangement operations.

/// Errors raised while preparing or running an arrangement.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The caller's cancellation token fired at a checkpoint. Coordinates
    /// written before the checkpoint are left in place.
    #[error("arrangement cancelled")]
    Cancelled,

    /// Grid parameters that the arranger must not be given.
    #[error("invalid grid parameters: {reason}")]
    InvalidParameters { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
