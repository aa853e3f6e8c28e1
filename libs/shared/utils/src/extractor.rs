use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
    body::Body,
};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_config::AppConfig;

use crate::jwt::validate_token;

/// Pull the bearer token out of the `Authorization` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    match auth_value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AppError::Auth("Invalid authorization header format".to_string())),
    }
}

// Validates the session token and stores the caller in request extensions
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?;

    let user = validate_token(&token, &config.jwt_secret)
        .map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

pub fn extract_user<B>(request: &Request<B>) -> Result<User, AppError> {
    request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::Auth("User not found in request extensions".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::{http::{HeaderValue, StatusCode}, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    use crate::test_utils::{JwtTestUtils, TestConfig, TestUser};

    fn protected_app(config: &TestConfig) -> Router {
        Router::new()
            .route("/whoami", get(|Extension(user): Extension<User>| async move { user.id }))
            .layer(middleware::from_fn_with_state(config.to_arc(), auth_middleware))
    }

    async fn call(app: Router, token: Option<String>) -> Response {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert_matches!(
            extract_bearer_token(&headers),
            Err(AppError::Auth(msg)) if msg == "Missing authorization header"
        );
    }

    #[test]
    fn test_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_matches!(
            extract_bearer_token(&headers),
            Err(AppError::Auth(msg)) if msg == "Invalid authorization header format"
        );
    }

    #[test]
    fn test_extract_user_without_middleware() {
        let request = Request::builder().body(()).unwrap();
        assert_matches!(extract_user(&request), Err(AppError::Auth(_)));
    }

    #[tokio::test]
    async fn test_middleware_inserts_user() {
        let config = TestConfig::default();
        let token = JwtTestUtils::create_test_token(&TestUser::pcp(21), &config.jwt_secret);

        let response = call(protected_app(&config), Some(token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"21");
    }

    #[tokio::test]
    async fn test_middleware_rejects_bad_tokens() {
        let config = TestConfig::default();
        let user = TestUser::pcp(21);

        for token in [
            None,
            Some(JwtTestUtils::create_expired_token(&user, &config.jwt_secret)),
            Some(JwtTestUtils::create_invalid_signature_token(&user)),
            Some(JwtTestUtils::create_malformed_token()),
        ] {
            let response = call(protected_app(&config), token).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
