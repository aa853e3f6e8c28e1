use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use auth_cell::router::auth_routes;
use conversation_cell::router::conversation_routes;
use conversation_cell::ConversationStore;
use referral_cell::router::referral_routes;
use referral_cell::ReferralStore;
use schedule_cell::router::schedule_routes;
use schedule_cell::AvailabilityStore;
use shared_config::AppConfig;

/// In-memory state shared by the cells for the life of the process.
#[derive(Clone, Default)]
pub struct Stores {
    pub conversations: ConversationStore,
    pub availability: AvailabilityStore,
    pub referrals: ReferralStore,
}

pub fn create_router(state: Arc<AppConfig>, stores: Stores) -> Router {
    Router::new()
        .route("/", get(|| async { "Referral Hub API is running!" }))
        .merge(auth_routes(state.clone()))
        .nest("/conversations", conversation_routes(state.clone(), stores.conversations))
        .nest("/schedule", schedule_routes(state.clone(), stores.availability))
        .nest("/referrals", referral_routes(state, stores.referrals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use serde_json::Value;
    use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};
    use tower::ServiceExt;

    fn app() -> (Router, String) {
        let config = TestConfig::default();
        let token = JwtTestUtils::create_test_token(&TestUser::specialist(9), &config.jwt_secret);
        (create_router(config.to_arc(), Stores::default()), token)
    }

    #[tokio::test]
    async fn test_root_is_public() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_conversations_are_public() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().method("POST").uri("/conversations").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["mode"], "none");
    }

    #[tokio::test]
    async fn test_schedule_and_referrals_require_token() {
        let (app, token) = app();
        for uri in ["/schedule/2024-06-03", "/referrals"] {
            let anonymous = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

            let authorized = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri(uri)
                        .header("authorization", format!("Bearer {}", token))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(authorized.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_route_guard_is_mounted_at_root() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/route?path=/specialist/schedule&role=pcp")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
