// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Internal header signatures.
//!
//! An assertion binds an identity to one HTTP method, one path and one
//! second. The signed message is
//!
//! ```text
//! identity | "|" | method | "|" | path | "|" | timestamp_seconds
//! ```
//!
//! MAC'd with HMAC-SHA256 and encoded as unpadded base64url. The same four
//! inputs always give the same signature, so the gatekeeper and any other
//! runtime holding the secret agree byte for byte. Replay protection comes
//! from the timestamp age check in [`super::internal`], not from the
//! signature itself.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::secret::{require_secret, SecretProvider};
use crate::config::{ConfigError, INTERNAL_AUTH_SECRET_ENV};

type HmacSha256 = Hmac<Sha256>;

/// The four signed fields of an internal header assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedFields<'a> {
    pub identity: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub timestamp: i64,
}

impl SignedFields<'_> {
    fn canonical(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.identity, self.method, self.path, self.timestamp
        )
    }
}

/// Signs and verifies internal header assertions with the internal secret.
#[derive(Clone)]
pub struct HeaderSigner {
    /// Keyed MAC state, cloned for every message.
    keyed: HmacSha256,
}

impl HeaderSigner {
    /// Build a signer from a secret provider. A missing or empty secret is a
    /// configuration error.
    pub fn new(provider: &dyn SecretProvider) -> Result<Self, ConfigError> {
        let secret = require_secret(provider, INTERNAL_AUTH_SECRET_ENV)?;
        let keyed = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
            ConfigError::InvalidValue {
                name: INTERNAL_AUTH_SECRET_ENV,
                value: "<redacted>".to_string(),
            }
        })?;
        Ok(Self { keyed })
    }

    fn mac(&self, fields: &SignedFields<'_>) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(fields.canonical().as_bytes());
        mac
    }

    /// Compute the base64url (unpadded) signature for `fields`.
    pub fn sign(&self, fields: &SignedFields<'_>) -> String {
        let digest = self.mac(fields).finalize().into_bytes();
        Base64UrlUnpadded::encode_string(&digest)
    }

    /// Check `signature` against `fields` in constant time.
    ///
    /// Undecodable or wrong-length signatures yield `false`.
    pub fn verify(&self, fields: &SignedFields<'_>, signature: &str) -> bool {
        let Ok(candidate) = Base64UrlUnpadded::decode_vec(signature) else {
            return false;
        };
        self.mac(fields).verify_slice(&candidate).is_ok()
    }
}

impl std::fmt::Debug for HeaderSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderSigner").finish_non_exhaustive()
    }
}
