//! Error types for fabric database operations.
//!
//! Errors fall into three origins which map onto the project status flags:
//! internal (programming) errors, errors in telemetry returned by the
//! management API, and errors in caller supplied parameters. Attribute
//! merge conflicts are not errors; they are reported as alerts.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fabric database operations.
pub type FcdbResult<T> = Result<T, FcdbError>;

/// Where an error came from. Selects which project status bit it raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorOrigin {
    /// An invariant inside this library was violated.
    Internal,
    /// Telemetry from the management API had an unexpected shape.
    Api,
    /// A caller supplied parameter was invalid.
    User,
}

/// Errors that can occur while building or analyzing the fabric database.
#[derive(Debug, Error)]
pub enum FcdbError {
    /// Internal invariant violated.
    #[error("Programming error in {context}: {message}")]
    Programming {
        /// Operation or component where the violation was detected.
        context: String,
        /// Error message.
        message: String,
    },

    /// Telemetry payload did not have the expected shape.
    #[error("Unexpected API response for '{uri}': {message}")]
    Api {
        /// URI the payload was returned for.
        uri: String,
        /// Error message.
        message: String,
    },

    /// Invalid caller supplied parameter.
    #[error("Invalid parameter '{parameter}': {message}")]
    User {
        /// The parameter that failed validation.
        parameter: String,
        /// Error message.
        message: String,
    },

    /// Attempted to write a reserved key through the generic attribute path.
    #[error("'{key}' is a reserved key and cannot be set")]
    ReservedKey {
        /// The reserved key.
        key: String,
    },

    /// Referenced entity does not exist.
    #[error("{kind} '{key}' not found")]
    EntityNotFound {
        /// Entity kind.
        kind: String,
        /// Entity key.
        key: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// File access failed.
    #[error("Failed to access '{path}': {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML decoding failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl FcdbError {
    /// Creates a programming error.
    pub fn programming(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Programming {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates an API error.
    pub fn api(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Creates a user error.
    pub fn user(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::User {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Creates an entity not found error.
    pub fn entity_not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::EntityNotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a file access error.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the origin used to pick the project status bit.
    pub fn origin(&self) -> ErrorOrigin {
        match self {
            FcdbError::Api { .. } => ErrorOrigin::Api,
            FcdbError::User { .. }
            | FcdbError::InvalidConfig { .. }
            | FcdbError::Io { .. }
            | FcdbError::Json(_)
            | FcdbError::Toml(_) => ErrorOrigin::User,
            FcdbError::Programming { .. }
            | FcdbError::ReservedKey { .. }
            | FcdbError::EntityNotFound { .. } => ErrorOrigin::Internal,
        }
    }
}
