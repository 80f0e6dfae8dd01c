// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Journal - Chat Journal Backend
//!
//! Journaling/chat service with two ways of authenticating a request: a
//! session cookie the handler verifies itself, or a signed identity assertion
//! forwarded by the edge gatekeeper.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session tokens, internal header signing, gatekeeper
//! - `config` - Environment configuration
//! - `ownership` - Thread ownership checks
//! - `service_client` - Signed service-to-service calls
//! - `store` - In-memory users, threads and messages

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod ownership;
pub mod service_client;
pub mod state;
pub mod store;
