use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Postgres SQLSTATE for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Database transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid database configuration: {0}")]
    Config(String),
}

impl DatabaseError {
    /// The PostgREST error code, when the backend reported one.
    pub fn code(&self) -> Option<&str> {
        match self {
            DatabaseError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.code() == Some(UNIQUE_VIOLATION)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Thin client for a PostgREST endpoint backing the relational tables.
#[derive(Clone)]
pub struct DatabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DatabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.database_url.trim_end_matches('/').to_string(),
            api_key: config.database_api_key.clone(),
        }
    }

    fn get_headers(&self, prefer_representation: bool) -> Result<HeaderMap, DatabaseError> {
        let mut headers = HeaderMap::new();

        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| DatabaseError::Config("API key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| DatabaseError::Config("API key is not a valid header value".to_string()))?;

        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if prefer_representation {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, DatabaseError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let prefer_representation = method == Method::POST || method == Method::PATCH;
        let headers = self.get_headers(prefer_representation)?;

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            let parsed = serde_json::from_str::<ApiErrorBody>(&error_text).ok();
            let (code, message) = match parsed {
                Some(body) => (body.code, body.message.unwrap_or(error_text)),
                None => (None, error_text),
            };

            return Err(DatabaseError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<T, DatabaseError>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/{}", table);
        let mut rows: Vec<T> = self.request(Method::POST, &path, Some(row)).await?;

        if rows.is_empty() {
            return Err(DatabaseError::Api {
                status: 500,
                code: None,
                message: format!("Insert into {} returned no rows", table),
            });
        }

        Ok(rows.remove(0))
    }

    /// Fetch at most one row matching `column = value`.
    pub async fn find_one<T>(&self, table: &str, column: &str, value: &str, select: &str) -> Result<Option<T>, DatabaseError>
    where T: DeserializeOwned {
        let path = format!(
            "/rest/v1/{}?{}=eq.{}&select={}&limit=1",
            table, column, urlencoding::encode(value), select
        );
        let mut rows: Vec<T> = self.request(Method::GET, &path, None).await?;

        if rows.is_empty() {
            return Ok(None);
        }

        Ok(Some(rows.remove(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::{MockServer, Mock, ResponseTemplate};
    use wiremock::matchers::{method, path, query_param, header};

    fn config_for(server: &MockServer) -> AppConfig {
        AppConfig {
            database_url: server.uri(),
            database_api_key: "test-api-key".to_string(),
            jwt_secret: "secret".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            conversation_reply_delay_ms: 0,
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: i64,
        email: String,
    }

    #[tokio::test]
    async fn test_insert_returns_first_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/users"))
            .and(header("apikey", "test-api-key"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                { "id": 7, "email": "a@b.com" }
            ])))
            .mount(&server)
            .await;

        let client = DatabaseClient::new(&config_for(&server));
        let row: Row = client.insert("users", json!({ "email": "a@b.com" })).await.unwrap();

        assert_eq!(row, Row { id: 7, email: "a@b.com".to_string() });
    }

    #[tokio::test]
    async fn test_unique_violation_is_detected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/users"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint \"users_email_key\""
            })))
            .mount(&server)
            .await;

        let client = DatabaseClient::new(&config_for(&server));
        let err = client.insert::<Row>("users", json!({ "email": "a@b.com" })).await.unwrap_err();

        assert!(err.is_unique_violation());
        assert_matches!(err, DatabaseError::Api { status: 409, .. });
    }

    #[tokio::test]
    async fn test_non_json_error_body_keeps_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let client = DatabaseClient::new(&config_for(&server));
        let err = client.find_one::<Row>("users", "email", "a@b.com", "id,email").await.unwrap_err();

        assert!(!err.is_unique_violation());
        assert_matches!(err, DatabaseError::Api { status: 503, code: None, ref message } if message == "upstream unavailable");
    }

    #[tokio::test]
    async fn test_find_one_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("email", "eq.nobody@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = DatabaseClient::new(&config_for(&server));
        let row = client.find_one::<Row>("users", "email", "nobody@example.com", "id,email").await.unwrap();

        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_find_one_encodes_filter_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("email", "eq.a+b;c=d?&é@example.com"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 3, "email": "a+b;c=d?&é@example.com" }
            ])))
            .mount(&server)
            .await;

        let client = DatabaseClient::new(&config_for(&server));
        let row = client
            .find_one::<Row>("users", "email", "a+b;c=d?&é@example.com", "id,email")
            .await
            .unwrap();

        assert_eq!(row.map(|r| r.id), Some(3));
    }
}
