use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;

use shared_config::AppConfig;

use crate::jwt::{issue_token_at, TOKEN_TTL_SECONDS};

pub struct TestConfig {
    pub jwt_secret: String,
    pub database_url: String,
    pub database_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            database_url: "http://localhost:54321".to_string(),
            database_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_database_url(url: &str) -> Self {
        Self {
            database_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database_url.clone(),
            database_api_key: self.database_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            conversation_reply_delay_ms: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new(1, "Test User", "test@example.com")
    }
}

impl TestUser {
    pub fn new(id: i64, name: &str, email: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    pub fn specialist(id: i64) -> Self {
        Self::new(id, "Dr. Test Specialist", &format!("specialist{}@example.com", id))
    }

    pub fn pcp(id: i64) -> Self {
        Self::new(id, "Dr. Test PCP", &format!("pcp{}@example.com", id))
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str) -> String {
        issue_token_at(user.id, secret, Utc::now(), Duration::seconds(TOKEN_TTL_SECONDS))
            .expect("test secret is not empty")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        issue_token_at(user.id, secret, Utc::now() - Duration::hours(2), Duration::seconds(TOKEN_TTL_SECONDS))
            .expect("test secret is not empty")
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret")
    }

    /// A correctly signed token with a foreign algorithm in its header.
    pub fn create_foreign_alg_token(user: &TestUser, secret: &str) -> String {
        let header = json!({ "alg": "HS512", "typ": "JWT" });
        let payload = json!({
            "sub": user.id.to_string(),
            "iat": Utc::now().timestamp(),
            "exp": (Utc::now() + Duration::hours(1)).timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature)
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}
