// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request gatekeeper.
//!
//! Runs in front of every `/api` route. For each request it:
//!
//! 1. captures any inbound `x-service-*` assertion and the session cookie,
//!    then strips all `x-internal-*`/`x-service-*` headers so nothing forged
//!    reaches a handler;
//! 2. tries the service assertion (signature, binding to this request,
//!    staleness);
//! 3. otherwise tries the session cookie;
//! 4. on success signs a fresh `x-internal-*` assertion for this request's
//!    method, path and the current second.
//!
//! A service assertion wins over a session cookie when both are valid.
//! Unauthenticated requests are forwarded without assertion headers and the
//! handlers reject them.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .nest("/api", api_routes)
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), gatekeeper));
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use serde::Serialize;

use super::{
    cookie::session_token,
    headers::{pack, strip, unpack, Assertion, Namespace},
    internal::is_stale,
    session::SessionCodec,
    signature::{HeaderSigner, SignedFields},
};
use crate::state::AppState;

/// How the caller's identity was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    UserSession,
    Service,
}

/// A resolved caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub identity: String,
    pub method: AuthMethod,
}

/// Identity resolution and assertion minting for one request.
pub struct Gatekeeper<'a> {
    sessions: &'a SessionCodec,
    signer: &'a HeaderSigner,
}

impl<'a> Gatekeeper<'a> {
    pub fn new(sessions: &'a SessionCodec, signer: &'a HeaderSigner) -> Self {
        Self { sessions, signer }
    }

    /// Resolve the caller of a `method` `path` request and rewrite `headers`
    /// for forwarding.
    ///
    /// On return `headers` carries no inbound assertion headers, and carries
    /// a fresh `x-internal-*` assertion iff the result is `Some`.
    pub fn authenticate(
        &self,
        headers: &mut HeaderMap,
        method: &Method,
        path: &str,
        now: i64,
    ) -> Option<AuthOutcome> {
        let service = unpack(headers, Namespace::Service);
        let token = session_token(headers).map(str::to_string);
        strip(headers);

        let outcome = service
            .and_then(|assertion| self.service_identity(assertion, method, path, now))
            .map(|identity| AuthOutcome {
                identity,
                method: AuthMethod::Service,
            })
            .or_else(|| {
                token
                    .and_then(|token| self.session_identity(&token))
                    .map(|identity| AuthOutcome {
                        identity,
                        method: AuthMethod::UserSession,
                    })
            })?;

        self.mint(headers, &outcome.identity, method, path, now)?;
        Some(outcome)
    }

    fn service_identity(
        &self,
        assertion: Assertion,
        method: &Method,
        path: &str,
        now: i64,
    ) -> Option<String> {
        if !self
            .signer
            .verify(&assertion.signed_fields(), &assertion.signature)
        {
            tracing::debug!(path, "Service assertion signature mismatch");
            return None;
        }
        if assertion.method != method.as_str() || assertion.path != path {
            tracing::debug!(
                path,
                signed_path = %assertion.path,
                signed_method = %assertion.method,
                "Service assertion bound to a different request"
            );
            return None;
        }
        if is_stale(assertion.timestamp, now) {
            tracing::debug!(path, "Service assertion is stale");
            return None;
        }
        Some(assertion.identity)
    }

    fn session_identity(&self, token: &str) -> Option<String> {
        match self.sessions.verify(token) {
            Ok(payload) => Some(payload.identity),
            Err(e) => {
                tracing::debug!(reason = %e, "Session token rejected by gatekeeper");
                None
            }
        }
    }

    fn mint(
        &self,
        headers: &mut HeaderMap,
        identity: &str,
        method: &Method,
        path: &str,
        now: i64,
    ) -> Option<()> {
        let fields = SignedFields {
            identity,
            method: method.as_str(),
            path,
            timestamp: now,
        };
        let assertion = Assertion {
            signature: self.signer.sign(&fields),
            identity: identity.to_string(),
            method: method.as_str().to_string(),
            path: path.to_string(),
            timestamp: now,
        };
        match pack(headers, &assertion, Namespace::Internal) {
            Ok(()) => Some(()),
            Err(e) => {
                tracing::warn!(error = %e, "Resolved identity cannot be forwarded as a header");
                None
            }
        }
    }
}

/// Axum middleware wrapping [`Gatekeeper::authenticate`].
pub async fn gatekeeper(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let outcome = Gatekeeper::new(&state.sessions, &state.signer).authenticate(
        request.headers_mut(),
        &method,
        &path,
        Utc::now().timestamp(),
    );

    match &outcome {
        Some(outcome) => tracing::debug!(
            identity = %outcome.identity,
            auth_method = ?outcome.method,
            %method,
            path = %path,
            "Request authenticated"
        ),
        None => tracing::debug!(%method, path = %path, "Request forwarded unauthenticated"),
    }

    next.run(request).await
}
