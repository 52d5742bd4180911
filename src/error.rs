//! Unified error handling for the visitplan crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`VisitplanErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust
//! use visitplan::error::{Error, ErrorCategory, VisitplanErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         println!("Retrying: {err}");
//!     } else {
//!         eprintln!("Fatal {}: {err}", err.category());
//!     }
//! }
//!
//! handle_error(Error::config("missing store URL"));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::calendar::CalendarError;
pub use crate::scheduler::error::SchedulerError;
pub use crate::store::StoreError;
pub use crate::sync::{ItemError, SyncError};

/// Common trait for visitplan error types
pub trait VisitplanErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout)
    Network,
    /// Schedule generation errors
    Scheduling,
    /// Holiday table errors
    Calendar,
    /// Batch synchronizer precondition errors
    Sync,
    /// File and serialization errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Scheduling => "scheduling",
            Self::Calendar => "calendar",
            Self::Sync => "sync",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error", self.as_str())
    }
}

/// Unified error type for the visitplan crate
#[derive(Error, Debug)]
pub enum Error {
    /// Schedule generation errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Holiday table errors
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Batch synchronizer precondition errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Record store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl VisitplanErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Scheduler(e) => e.is_recoverable(),
            Self::Calendar(_) => false,
            Self::Sync(_) => false,
            Self::Store(e) => e.is_recoverable(),
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) | Self::Toml(_) => false,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Scheduler(SchedulerError::IoError { .. }) => ErrorCategory::Storage,
            Self::Scheduler(SchedulerError::SerializationError { .. }) => ErrorCategory::Storage,
            Self::Scheduler(_) => ErrorCategory::Scheduling,
            Self::Calendar(_) => ErrorCategory::Calendar,
            Self::Sync(_) => ErrorCategory::Sync,
            Self::Store(StoreError::Request(_)) | Self::Http(_) => ErrorCategory::Network,
            Self::Store(StoreError::InvalidUrl(_)) => ErrorCategory::Config,
            Self::Store(_) => ErrorCategory::Network,
            Self::Io(_) | Self::Json(_) => ErrorCategory::Storage,
            Self::Toml(_) | Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: format!("{err:#}"),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
