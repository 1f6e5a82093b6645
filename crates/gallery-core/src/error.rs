//! Unified error type for the gallery.
//!
//! All crates funnel their failures into [`Error`]. An ownership mismatch is
//! deliberately absent: reads that filter by owner report `None` instead.

use std::fmt;

/// Unified error type covering all failure modes of the gallery.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "picture").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The record store rejected or failed an operation.
    #[error("Persist error: {source}")]
    Persist {
        /// The underlying store error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A file store operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Input data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested change collides with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A compensating action failed and left state needing reconciliation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Persist`].
    pub fn persist(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Persist {
            source: source.into(),
        }
    }

    /// Build an [`Error::Io`] from a message.
    pub fn io(message: impl Into<String>) -> Self {
        Error::Io {
            source: std::io::Error::other(message.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
