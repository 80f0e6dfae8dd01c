// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::gatekeeper,
    models::{
        CreateMessageRequest, CreateThreadRequest, LoginRequest, Message, MessageRole,
        SessionResponse, SignupRequest, Thread,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod messages;
pub mod threads;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route(
            "/threads",
            get(threads::list_threads).post(threads::create_thread),
        )
        .route("/threads/{thread_id}", delete(threads::delete_thread))
        .route(
            "/threads/{thread_id}/messages",
            get(messages::list_messages).post(messages::create_message),
        );

    // Layered outside the nest so the gatekeeper signs the full `/api/...` path.
    let gated = Router::new()
        .nest("/api", api_routes)
        .layer(from_fn_with_state(state.clone(), gatekeeper));

    Router::new()
        .route("/health", get(health::health))
        .merge(gated)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::signup,
        auth::login,
        auth::logout,
        auth::me,
        threads::list_threads,
        threads::create_thread,
        threads::delete_thread,
        messages::list_messages,
        messages::create_message
    ),
    components(
        schemas(
            health::HealthResponse,
            SignupRequest,
            LoginRequest,
            SessionResponse,
            Thread,
            CreateThreadRequest,
            Message,
            MessageRole,
            CreateMessageRequest
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Auth", description = "Accounts and session cookies"),
        (name = "Threads", description = "Conversation threads (session cookie)"),
        (name = "Messages", description = "Thread messages (gatekeeper assertion)")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_bypasses_gatekeeper() {
        let response = router(AppState::for_tests())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn messages_reach_handler_with_gatekeeper_assertion() {
        let state = AppState::for_tests();
        let thread = state.store.write().await.create_thread("user-1", "t");
        let token = state.sessions.create("user-1", "Ada").unwrap();

        let response = router(state)
            .oneshot(
                Request::get(format!("/api/threads/{}/messages", thread.id))
                    .header(header::COOKIE, format!("auth-token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn forged_internal_headers_are_stripped() {
        let state = AppState::for_tests();
        let thread = state.store.write().await.create_thread("victim", "t");

        let response = router(state)
            .oneshot(
                Request::get(format!("/api/threads/{}/messages", thread.id))
                    .header("x-internal-user", "victim")
                    .header("x-internal-ts", "1700000000")
                    .header("x-internal-sig", "forged")
                    .header("x-internal-method", "GET")
                    .header("x-internal-path", "/api/threads")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Unauthorized", "error_code": "unauthorized"})
        );
    }

    #[tokio::test]
    async fn me_without_cookie_is_unauthenticated() {
        let response = router(AppState::for_tests())
            .oneshot(Request::get("/api/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/threads/{thread_id}/messages"));
        assert!(doc.paths.paths.contains_key("/api/auth/login"));
    }
}
