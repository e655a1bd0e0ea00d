//! Error types for the construct crate

use thiserror::Error;

/// Errors raised while building or synthesizing a construct tree
#[derive(Error, Debug)]
pub enum Error {
    /// A construct id or stack name does not satisfy the naming rules
    #[error("invalid {kind} '{value}': {reason}")]
    InvalidId {
        kind: &'static str,
        value: String,
        reason: String,
    },

    /// Two constructs were declared at the same path
    #[error("a construct already exists at path '{0}'")]
    DuplicatePath(String),

    /// Two distinct paths collapsed onto one logical ID
    #[error("logical ID '{logical_id}' is already used by '{existing}'")]
    DuplicateLogicalId {
        logical_id: String,
        existing: String,
    },

    /// A stack with this name is already part of the app
    #[error("stack '{0}' already exists in this app")]
    DuplicateStack(String),

    /// An output with this name is already defined on the stack
    #[error("output '{0}' is already defined")]
    DuplicateOutput(String),

    /// A lookup by logical ID found nothing
    #[error("no resource with logical ID '{0}'")]
    UnknownResource(String),

    /// A token or dependency points at a resource that was never declared
    #[error("'{from}' references '{to}', which is not declared in this stack")]
    UnresolvedReference { from: String, to: String },

    /// The dependency graph is not a DAG
    #[error("dependency cycle between: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    /// A property could not be edited in place
    #[error("property '{property}' of '{logical_id}' is not {expected}")]
    PropertyShape {
        logical_id: String,
        property: String,
        expected: &'static str,
    },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for construct operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_id(
        kind: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidId {
            kind,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
