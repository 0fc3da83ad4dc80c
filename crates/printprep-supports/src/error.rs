//! Error types for the support pipeline.

use printprep_kernel::KernelError;
use thiserror::Error;

/// Errors that abort a preparation run.
///
/// Per-face, per-contact and per-panel geometric failures never surface
/// here; they are logged, counted and skipped.
#[derive(Error, Debug)]
pub enum PrepError {
    /// Configuration values are out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file is not valid TOML for [`PrepConfig`](crate::PrepConfig).
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Reading configuration or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required document object is absent.
    #[error("object '{0}' not found")]
    MissingObject(String),

    /// The printer name is not in the catalogue.
    #[error("unknown printer '{0}' (known: {known})", known = crate::fit::printer_names().join(", "))]
    UnknownPrinter(String),

    /// The model has no material.
    #[error("model is empty")]
    EmptyModel,

    /// A kernel operation that the run cannot continue without failed.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Result type for support pipeline operations.
pub type Result<T> = std::result::Result<T, PrepError>;
