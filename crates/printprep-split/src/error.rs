//! Error types for splitting and registration.

use printprep_kernel::KernelError;
use thiserror::Error;

/// Errors from splitting a solid.
#[derive(Error, Debug)]
pub enum SplitError {
    /// The cutting plane has a zero or non-finite normal, or a non-finite point.
    #[error("invalid split plane: {0}")]
    InvalidPlane(String),

    /// Registration settings are out of range.
    #[error("invalid registration settings: {0}")]
    InvalidConfig(String),

    /// A kernel boolean or primitive failed.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Result type for split operations.
pub type Result<T> = std::result::Result<T, SplitError>;
