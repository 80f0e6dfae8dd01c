// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Two ways for a handler to learn who is calling:
//!
//! ## Direct (session cookie)
//!
//! 1. Signup/login issue an HS256 session token in the `auth-token` cookie
//! 2. Handlers wrapped with [`with_session`] (or using [`SessionAuth`])
//!    verify the token themselves on every request
//!
//! ## Gatekeeper (signed internal headers)
//!
//! 1. The [`gatekeeper`] middleware strips inbound `x-internal-*` and
//!    `x-service-*` headers
//! 2. It resolves the caller from a signed `x-service-*` assertion or, failing
//!    that, the session cookie
//! 3. It signs a fresh `x-internal-*` assertion bound to the request's method,
//!    path and timestamp
//! 4. Handlers using [`InternalIdentity`] re-verify signature and age
//!    (120 seconds)
//!
//! ## Security
//!
//! - Session tokens and internal headers use separate secrets
//! - Signature comparison is constant-time
//! - Missing secrets are a startup error, never defaulted

pub mod cookie;
pub mod error;
pub mod gatekeeper;
pub mod headers;
pub mod internal;
pub mod password;
pub mod secret;
pub mod session;
pub mod signature;
pub mod wrapper;

pub use cookie::{CookieSettings, SESSION_COOKIE};
pub use error::AuthError;
pub use gatekeeper::{gatekeeper, AuthMethod, AuthOutcome, Gatekeeper};
pub use headers::{Assertion, Namespace};
pub use internal::{InternalIdentity, MAX_ASSERTION_AGE_SECS};
pub use secret::{EnvSecret, SecretProvider, StaticSecret};
pub use session::{SessionCodec, SessionPayload, SessionTokenError};
pub use signature::{HeaderSigner, SignedFields};
pub use wrapper::{authenticate_session, with_session, SessionAuth, SessionUser};
