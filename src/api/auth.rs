// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signup, login, logout and current-user endpoints.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    Json,
};

use crate::{
    auth::{AuthError, SessionAuth},
    error::ApiError,
    models::{LoginRequest, SessionResponse, SignupRequest, User},
    state::AppState,
    store::{create_identity, find_identity_for_credentials},
};

const MIN_PASSWORD_LEN: usize = 8;
const MAX_USERNAME_LEN: usize = 64;
const MAX_DISPLAY_NAME_LEN: usize = 100;

type SetCookie = [(header::HeaderName, HeaderValue); 1];

fn validate_signup(request: &SignupRequest) -> Result<(), ApiError> {
    let username = request.username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Username must be 1-{MAX_USERNAME_LEN} characters"
        )));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if let Some(name) = &request.display_name {
        if name.trim().is_empty() || name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(ApiError::bad_request(format!(
                "Display name must be 1-{MAX_DISPLAY_NAME_LEN} characters"
            )));
        }
    }
    Ok(())
}

/// Issue a session token for `user` and the cookie that carries it.
fn issue_session(state: &AppState, user: &User) -> Option<(SetCookie, Json<SessionResponse>)> {
    let token = state.sessions.create(&user.id, &user.display_name).ok()?;
    let cookie = state.cookies.session_cookie(&token)?;
    Some((
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            identity: user.id.clone(),
            display_name: user.display_name.clone(),
        }),
    ))
}

/// Create an account and start a session.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    tag = "Auth",
    responses(
        (status = 201, description = "Account created; session cookie set", body = SessionResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already taken"),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, SetCookie, Json<SessionResponse>), ApiError> {
    validate_signup(&request)?;
    let display_name = request
        .display_name
        .as_deref()
        .map(str::trim)
        .unwrap_or_else(|| request.username.trim());

    let user = create_identity(
        &state.store,
        &request.username,
        &request.password,
        display_name,
    )
    .await?;
    tracing::info!(identity = %user.id, "Account created");

    let (cookie, body) =
        issue_session(&state, &user).ok_or_else(|| ApiError::internal("Failed to start session"))?;
    Ok((StatusCode::CREATED, cookie, body))
}

/// Check credentials and start a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Logged in; session cookie set", body = SessionResponse),
        (status = 401, description = "Invalid username or password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(SetCookie, Json<SessionResponse>), AuthError> {
    let user = find_identity_for_credentials(&state.store, &request.username, &request.password)
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or(AuthError::InvalidCredentials)?;

    issue_session(&state, &user)
        .ok_or_else(|| AuthError::Internal("failed to issue session token".to_string()))
}

/// End the session by expiring the cookie.
///
/// Tokens are not revocable server-side; a copied token stays valid until it
/// expires.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 204, description = "Session cookie cleared"))
)]
pub async fn logout(State(state): State<AppState>) -> Result<(StatusCode, SetCookie), ApiError> {
    let cookie = state
        .cookies
        .clear_cookie()
        .ok_or_else(|| ApiError::internal("Failed to clear session"))?;
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

/// The caller behind the session cookie.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Missing or invalid session"),
    )
)]
pub async fn me(SessionAuth(user): SessionAuth) -> Json<SessionResponse> {
    Json(SessionResponse {
        identity: user.identity,
        display_name: user.display_name,
    })
}
