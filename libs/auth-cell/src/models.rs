use serde::Deserialize;
use thiserror::Error;
use tracing::error;

use shared_database::DatabaseError;
use shared_models::auth::UserAccount;
use shared_models::error::AppError;

pub const USERS_TABLE: &str = "users";

/// Row shape read back when authenticating.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCredentialRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl From<UserCredentialRow> for UserAccount {
    fn from(row: UserCredentialRow) -> Self {
        UserAccount {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("User with this email already exists")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Database failure: {0}")]
    Database(#[from] DatabaseError),

    #[error("Password hashing failure: {0}")]
    Hashing(String),

    #[error("Token signing failure: {0}")]
    Token(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateEmail => AppError::BadRequest(err.to_string()),
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::Validation(msg) => AppError::ValidationError(msg),
            other => {
                // Details stay in the log; callers only see a generic failure.
                error!("Authentication backend failure: {}", other);
                AppError::Internal("Internal server error".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_error_mapping() {
        assert_matches!(AppError::from(AuthError::DuplicateEmail), AppError::BadRequest(_));
        assert_matches!(AppError::from(AuthError::InvalidCredentials), AppError::Auth(msg) if msg == "Invalid credentials");
        assert_matches!(AppError::from(AuthError::Hashing("boom".into())), AppError::Internal(msg) if msg == "Internal server error");
    }
}
