// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// The internal-header variants (`MissingHeaders`, `InvalidTimestamp`,
/// `StaleRequest`, `InvalidSignature`) are distinct for logging and tests
/// but render the same response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No session cookie present
    MissingSession,
    /// Session cookie present but failed verification
    InvalidSession,
    /// Username/password pair not recognised
    InvalidCredentials,
    /// One or more internal assertion headers absent
    MissingHeaders,
    /// Internal assertion timestamp is not an integer
    InvalidTimestamp,
    /// Internal assertion older than the staleness window
    StaleRequest,
    /// Internal assertion signature does not match
    InvalidSignature,
    /// Internal error
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingSession => "unauthenticated",
            AuthError::InvalidSession | AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingHeaders
            | AuthError::InvalidTimestamp
            | AuthError::StaleRequest
            | AuthError::InvalidSignature => "unauthorized",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingSession
            | AuthError::InvalidSession
            | AuthError::InvalidCredentials
            | AuthError::MissingHeaders
            | AuthError::InvalidTimestamp
            | AuthError::StaleRequest
            | AuthError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Internal-header failures share one
    /// message; use `Display` for the precise reason in logs.
    fn public_message(&self) -> String {
        match self {
            AuthError::MissingHeaders
            | AuthError::InvalidTimestamp
            | AuthError::StaleRequest
            | AuthError::InvalidSignature => "Unauthorized".to_string(),
            AuthError::Internal(_) => "Internal authentication error".to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingSession => write!(f, "Authentication required"),
            AuthError::InvalidSession => write!(f, "Invalid or expired session"),
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::MissingHeaders => write!(f, "Internal auth headers are missing"),
            AuthError::InvalidTimestamp => write!(f, "Internal auth timestamp is invalid"),
            AuthError::StaleRequest => write!(f, "Internal auth assertion is stale"),
            AuthError::InvalidSignature => write!(f, "Internal auth signature is invalid"),
            AuthError::Internal(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(msg) = &self {
            tracing::error!(error = %msg, "Authentication failed internally");
        }
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
