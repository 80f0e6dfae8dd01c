// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement.
//!
//! The only authorization rule in this service: a caller may touch a thread
//! (and its messages) only if they own it.

use crate::error::ApiError;
use crate::store::InMemoryStore;

/// Check that `identity` owns `thread_id`.
///
/// Identities compare exactly (case-sensitive).
///
/// # Errors
/// `404` if the thread does not exist, `403` if someone else owns it.
pub fn ensure_thread_owner(
    store: &InMemoryStore,
    thread_id: &str,
    identity: &str,
) -> Result<(), ApiError> {
    let owner = store
        .thread_owner_of(thread_id)
        .ok_or_else(|| ApiError::not_found("Thread not found"))?;

    if owner != identity {
        tracing::debug!(thread_id, identity, "Ownership check failed");
        return Err(ApiError::forbidden("You do not have access to this thread"));
    }
    Ok(())
}
