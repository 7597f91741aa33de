//! Password authentication result and verification.
//!
//! Stored passwords are bcrypt hashes; comparison goes through
//! [`bcrypt::verify`], never plaintext equality.

use crate::row::Row;

/// Outcome of [`QueryBuilder::auth`](crate::QueryBuilder::auth).
///
/// Failure is always the same shape with the same message, whether the user
/// does not exist or the password is wrong, so the caller cannot tell the
/// two apart.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthResult {
    /// Verification succeeded; carries the matched rows.
    Success { rows: Vec<Row>, message: String },
    /// Verification failed; carries no data.
    Failed { message: String },
}

impl AuthResult {
    pub(crate) fn success(rows: Vec<Row>) -> Self {
        AuthResult::Success {
            rows,
            message: "Authentication Successful".to_string(),
        }
    }

    pub(crate) fn failed() -> Self {
        AuthResult::Failed {
            message: "Invalid Credentials".to_string(),
        }
    }

    /// Whether authentication succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, AuthResult::Success { .. })
    }

    /// Human-readable outcome message.
    pub fn message(&self) -> &str {
        match self {
            AuthResult::Success { message, .. } => message,
            AuthResult::Failed { message } => message,
        }
    }

    /// Matched rows (empty on failure).
    pub fn rows(&self) -> &[Row] {
        match self {
            AuthResult::Success { rows, .. } => rows,
            AuthResult::Failed { .. } => &[],
        }
    }
}

/// A well-formed bcrypt hash verified against when no user row was found,
/// so the missing-user path does the same work as the wrong-password path.
pub(crate) const DUMMY_HASH: &str =
    "$2a$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

/// Verify a plaintext password against a stored bcrypt hash.
///
/// A malformed stored hash counts as a verification failure.
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
