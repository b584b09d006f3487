//! Error types for corral operations.
//!
//! This module defines [`CorralError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `CorralError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `CorralError::Other`) for unexpected errors
//! - Nothing in the reconciliation path is fatal: pass-level failures are
//!   logged and swallowed at the overlay boundary, and the next trigger
//!   retries from scratch

use thiserror::Error;

/// Core error type for corral operations.
#[derive(Debug, Error)]
pub enum CorralError {
    /// No owner scope is currently resolvable; folder operations need one.
    #[error("No active conversation selected")]
    NoActiveScope,

    /// A folder name was empty after trimming.
    #[error("Folder name cannot be blank")]
    BlankFolderName,

    /// An expected anchor in the host's markup is missing; the current
    /// reconciliation pass is abandoned and retried on the next trigger.
    #[error("Host anchor missing: {anchor}")]
    HostShapeMismatch { anchor: String },

    /// The persisted layout blob could not be serialized for storage.
    #[error("Failed to serialize layout: {message}")]
    LayoutSerialize { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for corral operations.
pub type Result<T> = std::result::Result<T, CorralError>;
