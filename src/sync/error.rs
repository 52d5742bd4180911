//! Error types for batch synchronization

use thiserror::Error;

/// Result type for synchronizer entry points
pub type SyncResult<T> = Result<T, SyncError>;

/// Failure of a single remote item operation
///
/// The four client-class variants are permanent and never retried. Every
/// other variant is treated as transient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// Request rejected as malformed (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials lack permission (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Record does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Connection level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Unclassified failure
    #[error("{0}")]
    Other(String),
}

impl ItemError {
    /// Classify an HTTP status code
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => Self::BadRequest(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::Http { status, message },
        }
    }

    /// Client-class failure that will not succeed on retry
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::BadRequest(_) | Self::Unauthorized(_) | Self::Forbidden(_) | Self::NotFound(_)
        )
    }

    /// Eligible for retry with backoff
    pub fn is_transient(&self) -> bool {
        !self.is_permanent()
    }

    /// HTTP status associated with the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Precondition failures that abort a batch before any item is processed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Malformed batch input or options
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },
}

impl SyncError {
    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
