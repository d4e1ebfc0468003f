//! Shared error type across logprom crates.

use thiserror::Error;

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Metric name already taken in the registry.
    AlreadyRegistered,
    /// Label schema is inconsistent (duplicate keys, arity mismatch).
    InvalidLabels,
    /// Metric name unusable after sanitization.
    InvalidName,
    /// A collector failed while rendering the exposition.
    Render,
    /// Configuration rejected.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Global hook accessed before `init`.
    NotInitialized,
    /// Global hook installed twice.
    AlreadyInitialized,
}

impl ErrorCode {
    /// String representation used in logs and HTTP error bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::AlreadyRegistered => "ALREADY_REGISTERED",
            ErrorCode::InvalidLabels => "INVALID_LABELS",
            ErrorCode::InvalidName => "INVALID_NAME",
            ErrorCode::Render => "RENDER",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::NotInitialized => "NOT_INITIALIZED",
            ErrorCode::AlreadyInitialized => "ALREADY_INITIALIZED",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LogPromError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum LogPromError {
    #[error("metric already registered: {0}")]
    AlreadyRegistered(String),
    #[error("invalid labels: {0}")]
    InvalidLabels(String),
    #[error("invalid metric name: {0:?}")]
    InvalidName(String),
    #[error("render failed: {0}")]
    Render(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("global hook not initialized")]
    NotInitialized,
    #[error("global hook already initialized")]
    AlreadyInitialized,
}

impl LogPromError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            LogPromError::AlreadyRegistered(_) => ErrorCode::AlreadyRegistered,
            LogPromError::InvalidLabels(_) => ErrorCode::InvalidLabels,
            LogPromError::InvalidName(_) => ErrorCode::InvalidName,
            LogPromError::Render(_) => ErrorCode::Render,
            LogPromError::BadConfig(_) => ErrorCode::BadConfig,
            LogPromError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            LogPromError::NotInitialized => ErrorCode::NotInitialized,
            LogPromError::AlreadyInitialized => ErrorCode::AlreadyInitialized,
        }
    }
}
