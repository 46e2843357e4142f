//! Error types for the instadmin client

use std::{error::Error as StdError, fmt};

/// Main error type for the instadmin client
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// Validation error raised before a request leaves the client
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Transport-level HTTP failure (connect, timeout, body decode)
    Http(String),

    /// The API answered with a non-success status
    Api {
        /// HTTP status code
        status: u16,
        /// Detail message from the response body
        message: String,
    },

    /// The API rejected the bearer token; the session has been cleared
    Unauthorized,

    /// The login form was rejected
    InvalidCredentials {
        /// Detail message from the response body
        message: String,
    },

    /// Not found error
    NotFound {
        /// Resource that was not found
        resource: String,
    },

    /// Serialization error
    Serialization(serde_json::Error),

    /// Token storage error
    Storage(String),

    /// Other error
    Other(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a validation error for a field
    #[must_use]
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the session was rejected by the API
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// HTTP status associated with the error, if any
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized | Self::InvalidCredentials { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
            Self::Http(msg) => write!(f, "HTTP error: {msg}"),
            Self::Api { status, message } => write!(f, "API error ({status}): {message}"),
            Self::Unauthorized => write!(f, "Session expired or invalid, please log in again"),
            Self::InvalidCredentials { message } => write!(f, "Login failed: {message}"),
            Self::NotFound { resource } => write!(f, "Resource not found: {resource}"),
            Self::Serialization(err) => write!(f, "Serialization error: {err}"),
            Self::Storage(msg) => write!(f, "Token storage error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

/// Errors are shared between callers waiting on the same request.
///
/// Wrapped I/O and JSON errors keep their kind and message but lose
/// their original source chain.
impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Self::Io(err) => Self::Io(std::io::Error::new(err.kind(), err.to_string())),
            Self::Configuration { message } => Self::Configuration {
                message: message.clone(),
            },
            Self::Validation { field, message } => Self::Validation {
                field: field.clone(),
                message: message.clone(),
            },
            Self::Http(msg) => Self::Http(msg.clone()),
            Self::Api { status, message } => Self::Api {
                status: *status,
                message: message.clone(),
            },
            Self::Unauthorized => Self::Unauthorized,
            Self::InvalidCredentials { message } => Self::InvalidCredentials {
                message: message.clone(),
            },
            Self::NotFound { resource } => Self::NotFound {
                resource: resource.clone(),
            },
            Self::Serialization(err) => {
                Self::Serialization(<serde_json::Error as serde::de::Error>::custom(err))
            }
            Self::Storage(msg) => Self::Storage(msg.clone()),
            Self::Other(msg) => Self::Other(msg.clone()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), ToString::to_string)
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                Self::validation(field.to_string(), message)
            }
            None => Self::validation("input", "invalid input"),
        }
    }
}
