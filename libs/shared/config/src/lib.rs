use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_api_key: String,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub conversation_reply_delay_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_URL not set, using empty value");
                    String::new()
                }),
            database_api_key: env::var("DATABASE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_API_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or_else(|| {
                    warn!("SERVER_PORT not set or invalid, using default 3000");
                    3000
                }),
            conversation_reply_delay_ms: env::var("CONVERSATION_REPLY_DELAY_MS")
                .ok()
                .and_then(|delay| delay.parse().ok())
                .unwrap_or(0),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.database_url.is_empty()
            && !self.database_api_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            database_url: "http://localhost:54321".to_string(),
            database_api_key: "anon".to_string(),
            jwt_secret: "secret".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            conversation_reply_delay_ms: 0,
        }
    }

    #[test]
    fn test_is_configured_requires_database_and_secret() {
        let config = sample();
        assert!(config.is_configured());

        let missing_secret = AppConfig { jwt_secret: String::new(), ..sample() };
        assert!(!missing_secret.is_configured());

        let missing_url = AppConfig { database_url: String::new(), ..sample() };
        assert!(!missing_url.is_configured());
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(sample().bind_address(), "127.0.0.1:8080");
    }
}
