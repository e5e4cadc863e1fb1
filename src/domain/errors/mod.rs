// Domain errors - Error types for the domain layer and engine port

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// Conversion settings outside their allowed range
    InvalidSettings(String),
    /// File not found
    FileNotFound(String),
    /// File system operation failed (real or engine-virtual)
    FsFail(String),
    /// Engine could not be located or loaded
    EngineUnavailable(String),
    /// Engine operation failed after loading
    EngineFailure(String),
    /// Internal error
    InternalError(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::InvalidSettings(msg) => write!(f, "Invalid settings: {}", msg),
            DomainError::FileNotFound(msg) => write!(f, "File not found: {}", msg),
            DomainError::FsFail(msg) => write!(f, "File system error: {}", msg),
            DomainError::EngineUnavailable(msg) => write!(f, "Engine unavailable: {}", msg),
            DomainError::EngineFailure(msg) => write!(f, "Engine failure: {}", msg),
            DomainError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
