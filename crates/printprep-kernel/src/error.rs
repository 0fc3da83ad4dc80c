//! Error types for the geometry kernel.

use thiserror::Error;

/// Errors that can occur in kernel operations.
#[derive(Error, Debug)]
pub enum KernelError {
    /// Geometry is degenerate (zero-area face, non-finite coordinates, consumed face).
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    /// Invalid argument to a constructor or operation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// I/O failure while exporting.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Mesh export failed.
    #[error("export failed: {0}")]
    Export(String),
}

/// Result type for kernel operations.
pub type KernelResult<T> = std::result::Result<T, KernelError>;
