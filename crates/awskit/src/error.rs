//! Error types for AWS resource builders.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while declaring AWS resources.
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the underlying construct tree
    #[error(transparent)]
    Construct(#[from] construct::Error),

    /// A property value is outside what the service accepts
    #[error("invalid {property} for '{resource}': {reason}")]
    InvalidProperty {
        /// Construct id of the resource being declared
        resource: String,
        /// Property name
        property: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// An API path part already exists under the same parent
    #[error("resource '{path}' already exists")]
    DuplicateApiResource {
        /// Full API path of the duplicate
        path: String,
    },

    /// A method is already bound on this API resource
    #[error("method {method} is already defined on '{path}'")]
    DuplicateMethod {
        /// HTTP method
        method: String,
        /// Full API path
        path: String,
    },

    /// The API resource handle belongs to a different REST API
    #[error("resource '{path}' does not belong to API '{api}'")]
    ForeignApiResource {
        /// Full API path of the handle
        path: String,
        /// Construct id of the API it was passed to
        api: String,
    },

    /// Entry file exists but could not be read for fingerprinting
    #[error("failed to read entry {}: {source}", .path.display())]
    EntryUnreadable {
        /// Entry path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Bundling options could not be serialized for fingerprinting
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(resource: &str, property: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidProperty {
            resource: resource.to_string(),
            property,
            reason: reason.into(),
        }
    }
}

/// Result type for AWS resource builders.
pub type Result<T> = std::result::Result<T, Error>;
