//! Error types for pgqb

use thiserror::Error;

/// Result type alias for pgqb operations
pub type QbResult<T> = Result<T, QbError>;

/// Error types for query building and execution
#[derive(Debug, Error)]
pub enum QbError {
    /// Failure to establish or drive the underlying session
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error surfaced by the backend (SQLSTATE preserved in the source)
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/shaping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Caller violated a precondition; no SQL was sent
    #[error("Usage error: {0}")]
    Usage(String),

    /// HTTP request error
    #[cfg(feature = "rest")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl QbError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Check if this is a usage error
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Parse a tokio_postgres error into a more specific QbError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{constraint}: {message}")),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{constraint}: {message}"));
                }
                "23514" => return Self::CheckViolation(format!("{constraint}: {message}")),
                _ => {}
            }
        }
        Self::Query(err)
    }
}
