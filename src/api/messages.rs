// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Message endpoints.
//!
//! Identity comes from the gatekeeper's signed `x-internal-*` assertion via
//! [`InternalIdentity`]; session cookies are never read here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::InternalIdentity,
    error::ApiError,
    models::{CreateMessageRequest, Message},
    ownership::ensure_thread_owner,
    state::AppState,
};

const MAX_CONTENT_LEN: usize = 32_000;

/// Messages of a thread, oldest first.
#[utoipa::path(
    get,
    path = "/api/threads/{thread_id}/messages",
    tag = "Messages",
    params(("thread_id" = String, Path, description = "Thread ID")),
    responses(
        (status = 200, description = "Messages in the thread", body = Vec<Message>),
        (status = 401, description = "Missing or invalid internal assertion"),
        (status = 403, description = "Thread belongs to someone else"),
        (status = 404, description = "Thread not found"),
    )
)]
pub async fn list_messages(
    InternalIdentity(identity): InternalIdentity,
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let store = state.store.read().await;
    ensure_thread_owner(&store, &thread_id, &identity)?;
    Ok(Json(store.list_messages(&thread_id)))
}

/// Append a message to a thread.
#[utoipa::path(
    post,
    path = "/api/threads/{thread_id}/messages",
    tag = "Messages",
    params(("thread_id" = String, Path, description = "Thread ID")),
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = Message),
        (status = 400, description = "Empty or oversized content"),
        (status = 401, description = "Missing or invalid internal assertion"),
        (status = 403, description = "Thread belongs to someone else"),
        (status = 404, description = "Thread not found"),
    )
)]
pub async fn create_message(
    InternalIdentity(identity): InternalIdentity,
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Json(request): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("Message content is required"));
    }
    if request.content.chars().count() > MAX_CONTENT_LEN {
        return Err(ApiError::bad_request(format!(
            "Message content must be at most {MAX_CONTENT_LEN} characters"
        )));
    }

    let mut store = state.store.write().await;
    ensure_thread_owner(&store, &thread_id, &identity)?;
    let message = store.append_message(&thread_id, request.role, &request.content)?;
    Ok((StatusCode::CREATED, Json(message)))
}
