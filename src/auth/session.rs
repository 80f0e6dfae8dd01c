// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token codec.
//!
//! Session tokens are HS256 JWTs carrying exactly `{identity, displayName}`
//! plus `iat`/`exp`. They expire 24 hours after issuance and are verified on
//! every protected request. They are signed with their own secret, separate
//! from the internal-header key.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::secret::{require_secret, SecretProvider};
use crate::config::{ConfigError, SESSION_SECRET_ENV};

/// Session lifetime (24 hours).
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// The verified contents of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub identity: String,
    pub display_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionClaims<'a> {
    identity: &'a str,
    display_name: &'a str,
    iat: i64,
    exp: i64,
}

/// Why a session token was rejected.
///
/// Bad signature, malformed structure and expiry all collapse into
/// `InvalidToken`. `InvalidPayload` means the signature checked out but the
/// claims do not have the expected shape (including empty strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionTokenError {
    #[error("INVALID_TOKEN")]
    InvalidToken,

    #[error("INVALID_PAYLOAD")]
    InvalidPayload,
}

/// Creates and verifies session tokens.
#[derive(Clone)]
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionCodec {
    /// Build a codec from a secret provider.
    ///
    /// Fails before any signing can happen when the secret is missing or
    /// empty.
    pub fn new(provider: &dyn SecretProvider) -> Result<Self, ConfigError> {
        let secret = require_secret(provider, SESSION_SECRET_ENV)?;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Issue a token for `identity`, valid for 24 hours from now.
    pub fn create(&self, identity: &str, display_name: &str) -> Result<String, SessionTokenError> {
        self.create_at(identity, display_name, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `issued_at`.
    pub fn create_at(
        &self,
        identity: &str,
        display_name: &str,
        issued_at: i64,
    ) -> Result<String, SessionTokenError> {
        let claims = SessionClaims {
            identity,
            display_name,
            iat: issued_at,
            exp: issued_at + SESSION_TTL_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "Failed to encode session token");
            SessionTokenError::InvalidToken
        })
    }

    /// Check signature and expiry, then extract the payload.
    pub fn verify(&self, token: &str) -> Result<SessionPayload, SessionTokenError> {
        if token.is_empty() {
            return Err(SessionTokenError::InvalidToken);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        let data = decode::<Value>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(kind = ?e.kind(), "Session token rejected");
            SessionTokenError::InvalidToken
        })?;

        let field = |name: &str| {
            data.claims
                .get(name)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        match (field("identity"), field("displayName")) {
            (Some(identity), Some(display_name)) => Ok(SessionPayload {
                identity,
                display_name,
            }),
            _ => Err(SessionTokenError::InvalidPayload),
        }
    }
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec").finish_non_exhaustive()
    }
}
