// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Handler-side verification of gatekeeper assertions.
//!
//! Handlers behind the gatekeeper never see the session cookie's verified
//! payload; they trust the `x-internal-*` headers only after re-checking the
//! signature and age here.
//!
//! ```rust,ignore
//! async fn list_messages(InternalIdentity(identity): InternalIdentity) -> impl IntoResponse {
//!     // identity was signed by the gatekeeper for this request
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use chrono::Utc;

use super::{
    headers::{unpack_raw, Namespace},
    signature::HeaderSigner,
    AuthError,
};
use crate::state::AppState;

/// Maximum age of an assertion before it is treated as a replay.
pub const MAX_ASSERTION_AGE_SECS: i64 = 120;

/// Whether an assertion minted at `timestamp` is too old at `now`.
///
/// Future timestamps (clock skew) are not stale.
pub fn is_stale(timestamp: i64, now: i64) -> bool {
    now.saturating_sub(timestamp) > MAX_ASSERTION_AGE_SECS
}

/// Verify the `x-internal-*` assertion on `headers` at time `now` and return
/// the asserted identity.
pub fn resolve_identity(
    headers: &HeaderMap,
    signer: &HeaderSigner,
    now: i64,
) -> Result<String, AuthError> {
    let raw = unpack_raw(headers, Namespace::Internal).ok_or(AuthError::MissingHeaders)?;
    let assertion = raw.parse().ok_or(AuthError::InvalidTimestamp)?;

    if is_stale(assertion.timestamp, now) {
        return Err(AuthError::StaleRequest);
    }

    if !signer.verify(&assertion.signed_fields(), &assertion.signature) {
        return Err(AuthError::InvalidSignature);
    }

    Ok(assertion.identity)
}

/// Extractor yielding the identity asserted by the gatekeeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalIdentity(pub String);

impl FromRequestParts<AppState> for InternalIdentity {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_identity(&parts.headers, &state.signer, Utc::now().timestamp())
            .map(InternalIdentity)
            .map_err(|e| {
                tracing::debug!(reason = %e, path = %parts.uri.path(), "Internal assertion rejected");
                e
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        headers::{pack, Assertion},
        secret::StaticSecret,
        signature::SignedFields,
    };
    use axum::http::{HeaderValue, Request};

    const NOW: i64 = 1_700_000_000;

    fn signer() -> HeaderSigner {
        HeaderSigner::new(&StaticSecret::new("internal-secret")).unwrap()
    }

    fn signed_headers(identity: &str, timestamp: i64) -> HeaderMap {
        let signature = signer().sign(&SignedFields {
            identity,
            method: "POST",
            path: "/api/chat",
            timestamp,
        });
        let mut headers = HeaderMap::new();
        pack(
            &mut headers,
            &Assertion {
                identity: identity.to_string(),
                method: "POST".to_string(),
                path: "/api/chat".to_string(),
                timestamp,
                signature,
            },
            Namespace::Internal,
        )
        .unwrap();
        headers
    }

    #[test]
    fn fresh_assertion_resolves_identity() {
        let headers = signed_headers("user-123", NOW - 5);
        assert_eq!(
            resolve_identity(&headers, &signer(), NOW),
            Ok("user-123".to_string())
        );
    }

    #[test]
    fn missing_header_is_missing_headers() {
        let mut headers = signed_headers("user-123", NOW);
        headers.remove("x-internal-sig");
        assert_eq!(
            resolve_identity(&headers, &signer(), NOW),
            Err(AuthError::MissingHeaders)
        );
    }

    #[test]
    fn non_numeric_timestamp_is_invalid_timestamp() {
        let mut headers = signed_headers("user-123", NOW);
        headers.insert("x-internal-ts", HeaderValue::from_static("12abc"));
        assert_eq!(
            resolve_identity(&headers, &signer(), NOW),
            Err(AuthError::InvalidTimestamp)
        );
    }

    #[test]
    fn staleness_window_boundary() {
        let signer = signer();
        assert!(resolve_identity(&signed_headers("u", NOW - 119), &signer, NOW).is_ok());
        assert!(resolve_identity(&signed_headers("u", NOW - 120), &signer, NOW).is_ok());
        assert_eq!(
            resolve_identity(&signed_headers("u", NOW - 121), &signer, NOW),
            Err(AuthError::StaleRequest)
        );
    }

    #[test]
    fn future_timestamp_is_accepted() {
        let headers = signed_headers("user-123", NOW + 30);
        assert!(resolve_identity(&headers, &signer(), NOW).is_ok());
    }

    #[test]
    fn extreme_timestamp_does_not_overflow() {
        let headers = signed_headers("user-123", i64::MIN);
        assert_eq!(
            resolve_identity(&headers, &signer(), NOW),
            Err(AuthError::StaleRequest)
        );
    }

    #[test]
    fn swapped_identity_is_invalid_signature() {
        let mut headers = signed_headers("user-123", NOW);
        headers.insert("x-internal-user", HeaderValue::from_static("user-456"));
        assert_eq!(
            resolve_identity(&headers, &signer(), NOW),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn changed_path_or_method_is_invalid_signature() {
        let mut headers = signed_headers("user-123", NOW);
        headers.insert("x-internal-path", HeaderValue::from_static("/api/admin"));
        assert_eq!(
            resolve_identity(&headers, &signer(), NOW),
            Err(AuthError::InvalidSignature)
        );

        let mut headers = signed_headers("user-123", NOW);
        headers.insert("x-internal-method", HeaderValue::from_static("DELETE"));
        assert_eq!(
            resolve_identity(&headers, &signer(), NOW),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn stale_check_precedes_signature_check() {
        let mut headers = signed_headers("user-123", NOW - 500);
        headers.insert("x-internal-sig", HeaderValue::from_static("garbage"));
        assert_eq!(
            resolve_identity(&headers, &signer(), NOW),
            Err(AuthError::StaleRequest)
        );
    }

    #[test]
    fn service_namespace_is_not_accepted() {
        let internal = signed_headers("user-123", NOW);
        let mut headers = HeaderMap::new();
        for (name, value) in &internal {
            let renamed = name.as_str().replace("x-internal", "x-service");
            headers.insert(
                axum::http::HeaderName::from_bytes(renamed.as_bytes()).unwrap(),
                value.clone(),
            );
        }
        assert_eq!(
            resolve_identity(&headers, &signer(), NOW),
            Err(AuthError::MissingHeaders)
        );
    }

    #[tokio::test]
    async fn extractor_rejects_request_without_headers() {
        let state = AppState::for_tests();
        let mut parts = Request::builder()
            .uri("/api/threads/t/messages")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = InternalIdentity::from_request_parts(&mut parts, &state).await;
        assert_eq!(result, Err(AuthError::MissingHeaders));
    }
}
