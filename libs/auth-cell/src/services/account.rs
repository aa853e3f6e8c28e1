use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;
use tokio::task;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::DatabaseClient;
use shared_models::auth::{LoginRequest, SignupRequest, UserAccount};
use shared_utils::jwt::issue_token;

use crate::models::{AuthError, UserCredentialRow, USERS_TABLE};
use crate::services::password::PasswordService;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

pub struct AccountService {
    database: DatabaseClient,
    jwt_secret: String,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            database: DatabaseClient::new(config),
            jwt_secret: config.jwt_secret.clone(),
        }
    }

    /// Register a new account. The stored credential is always an Argon2 hash.
    pub async fn signup(&self, request: SignupRequest) -> Result<UserAccount, AuthError> {
        let name = request.name.trim().to_string();
        let email = normalize_email(&request.email);

        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }
        if !email_pattern().is_match(&email) {
            return Err(AuthError::Validation("A valid email is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        debug!("Registering user: {}", email);

        let password = request.password;
        let password_hash = task::spawn_blocking(move || PasswordService::hash_password(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        let row = json!({
            "name": name,
            "email": email,
            "password_hash": password_hash,
        });

        let account: UserAccount = self.database
            .insert(USERS_TABLE, row)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    warn!("Signup rejected, email already registered: {}", email);
                    AuthError::DuplicateEmail
                } else {
                    AuthError::Database(e)
                }
            })?;

        info!("User registered with id: {}", account.id);
        Ok(account)
    }

    /// Authenticate and issue a one-hour session token.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(&self, request: LoginRequest) -> Result<String, AuthError> {
        let email = normalize_email(&request.email);
        debug!("Login attempt for: {}", email);

        let row: Option<UserCredentialRow> = self.database
            .find_one(USERS_TABLE, "email", &email, "id,name,email,password_hash")
            .await?;

        let password = request.password;
        let verified = task::spawn_blocking(move || match row {
            Some(row) => PasswordService::verify_password(&password, &row.password_hash)
                .map(|ok| ok.then_some(row)),
            None => {
                PasswordService::verify_against_dummy(&password);
                Ok(None)
            }
        })
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

        let Some(user) = verified else {
            warn!("Invalid credentials for: {}", email);
            return Err(AuthError::InvalidCredentials);
        };

        let token = issue_token(user.id, &self.jwt_secret).map_err(AuthError::Token)?;

        info!("User {} logged in", user.id);
        Ok(token)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(email_pattern().is_match("a@b.com"));
        assert!(email_pattern().is_match("first.last+tag@clinic.example.org"));
        assert!(!email_pattern().is_match("no-at-sign.com"));
        assert!(!email_pattern().is_match("two words@b.com"));
        assert!(!email_pattern().is_match("a@nodot"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@B.Com "), "a@b.com");
    }
}
