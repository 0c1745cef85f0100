//! Error types for gallery operations.

use thiserror::Error;

/// Errors that can occur while talking to the gallery backend or
/// mutating gallery state.
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Transport-level failure (connection refused, aborted fetch, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-success status
    #[error("{endpoint} returned status {status}")]
    Status {
        /// Route that was called
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// A tag with this name already exists
    #[error("Tag '{name}' already exists")]
    TagExists {
        /// The conflicting name
        name: String,
    },

    /// The tag is not in the tag list
    #[error("Tag '{name}' not found")]
    TagNotFound {
        /// The missing name
        name: String,
    },

    /// Tag names must contain at least one non-blank character
    #[error("Tag name must not be empty")]
    EmptyTagName,

    /// Row index does not refer to a live menu row
    #[error("Row {index} is out of range")]
    RowOutOfRange {
        /// The offending index
        index: usize,
    },

    /// No backend origin is configured and none can be derived
    #[error("No base URL configured for the gallery backend")]
    MissingBaseUrl,

    /// The backend cannot be reached at all
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl GalleryError {
    /// Create a status error for a route.
    pub fn status(endpoint: impl Into<String>, status: u16) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
        }
    }

    /// Create a tag conflict error.
    pub fn tag_exists(name: impl Into<String>) -> Self {
        Self::TagExists { name: name.into() }
    }

    /// Create an unknown tag error.
    pub fn tag_not_found(name: impl Into<String>) -> Self {
        Self::TagNotFound { name: name.into() }
    }

    /// Whether this is a data conflict rejected before any remote call,
    /// as opposed to a transient failure.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::TagExists { .. }
                | Self::TagNotFound { .. }
                | Self::EmptyTagName
                | Self::RowOutOfRange { .. }
        )
    }
}

/// Result alias for gallery operations.
pub type GalleryResult<T> = Result<T, GalleryError>;
