// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Thread endpoints.
//!
//! These read the session cookie themselves through [`with_session`] rather
//! than trusting the gatekeeper's assertion. Request bodies are decoded
//! inside the guard so authentication is always checked first.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::{
    auth::{with_session, AuthError, SessionUser},
    error::ApiError,
    models::{CreateThreadRequest, Thread},
    ownership::ensure_thread_owner,
    state::AppState,
};

const DEFAULT_TITLE: &str = "New conversation";
const MAX_TITLE_LEN: usize = 200;

async fn list_for(user: SessionUser, state: AppState) -> Json<Vec<Thread>> {
    Json(state.store.read().await.list_threads(&user.identity))
}

async fn create_for(
    user: SessionUser,
    (state, body): (AppState, Bytes),
) -> Result<(StatusCode, Json<Thread>), ApiError> {
    let request: CreateThreadRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?;
    let title = match request.title.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_TITLE,
        Some(title) if title.chars().count() > MAX_TITLE_LEN => {
            return Err(ApiError::bad_request(format!(
                "Title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        Some(title) => title,
    };

    let thread = state.store.write().await.create_thread(&user.identity, title);
    tracing::debug!(thread_id = %thread.id, identity = %user.identity, "Thread created");
    Ok((StatusCode::CREATED, Json(thread)))
}

async fn delete_for(
    user: SessionUser,
    (state, thread_id): (AppState, String),
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    ensure_thread_owner(&store, &thread_id, &user.identity)?;
    store.delete_thread(&thread_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the caller's threads, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/threads",
    tag = "Threads",
    responses(
        (status = 200, description = "Threads owned by the caller", body = Vec<Thread>),
        (status = 401, description = "Missing or invalid session"),
    )
)]
pub async fn list_threads(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Thread>>, AuthError> {
    with_session(state.sessions.clone(), list_for)
        .call(&headers, state)
        .await
}

/// Start a new thread.
#[utoipa::path(
    post,
    path = "/api/threads",
    request_body = CreateThreadRequest,
    tag = "Threads",
    responses(
        (status = 201, description = "Thread created", body = Thread),
        (status = 400, description = "Invalid body or title"),
        (status = 401, description = "Missing or invalid session"),
    )
)]
pub async fn create_thread(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Result<(StatusCode, Json<Thread>), ApiError>, AuthError> {
    with_session(state.sessions.clone(), create_for)
        .call(&headers, (state, body))
        .await
}

/// Delete a thread and all of its messages.
#[utoipa::path(
    delete,
    path = "/api/threads/{thread_id}",
    tag = "Threads",
    params(("thread_id" = String, Path, description = "Thread ID")),
    responses(
        (status = 204, description = "Thread deleted"),
        (status = 401, description = "Missing or invalid session"),
        (status = 403, description = "Thread belongs to someone else"),
        (status = 404, description = "Thread not found"),
    )
)]
pub async fn delete_thread(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(thread_id): Path<String>,
) -> Result<Result<StatusCode, ApiError>, AuthError> {
    with_session(state.sessions.clone(), delete_for)
        .call(&headers, (state, thread_id))
        .await
}
