// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store for users, threads and messages.
//!
//! Shared as `Arc<RwLock<InMemoryStore>>` in [`crate::state::AppState`].
//! Provides the lookups the auth layer depends on
//! (`find_identity_for_credentials`, `create_identity`, `thread_owner_of`)
//! alongside thread/message CRUD. The two credential functions are free
//! async functions over the shared lock because password hashing must not
//! run while the lock is held.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password, PasswordHashError, DUMMY_HASH};
use crate::error::ApiError;
use crate::models::{Message, MessageRole, Thread, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username is already taken")]
    UsernameTaken,

    #[error("thread {0} not found")]
    ThreadNotFound(String),

    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),

    #[error("password task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::UsernameTaken => ApiError::conflict(error.to_string()),
            StoreError::ThreadNotFound(_) => ApiError::not_found("Thread not found"),
            StoreError::PasswordHash(_) | StoreError::Blocking(_) => {
                tracing::error!(error = %error, "Password hashing failed");
                ApiError::internal("Failed to create account")
            }
        }
    }
}

struct UserRecord {
    user: User,
    password_hash: String,
}

/// Canonical form of a username for lookups: NFKC, trimmed, lower-cased.
pub fn normalize_username(username: &str) -> String {
    username.trim().nfkc().collect::<String>().to_lowercase()
}

/// Stored credentials for one login attempt, copied out of the store so the
/// password check runs without holding the lock.
///
/// Unknown usernames carry [`DUMMY_HASH`], so both outcomes pay for a full
/// PBKDF2 derivation.
#[derive(Debug, Clone)]
pub struct CredentialCheck {
    user: Option<User>,
    password_hash: String,
}

impl CredentialCheck {
    /// Run the password check; CPU-bound.
    pub fn verify(self, password: &str) -> Option<User> {
        let matches = verify_password(password, &self.password_hash);
        self.user.filter(|_| matches)
    }
}

/// Look up a user by username and password.
///
/// Unknown usernames and wrong passwords both return `None` after the same
/// amount of hashing. The hash runs on the blocking pool, outside the lock.
pub async fn find_identity_for_credentials(
    store: &RwLock<InMemoryStore>,
    username: &str,
    password: &str,
) -> Result<Option<User>, StoreError> {
    let check = store.read().await.credential_check(username);
    let password = password.to_owned();
    Ok(tokio::task::spawn_blocking(move || check.verify(&password)).await?)
}

/// Register a new identity.
///
/// The password is hashed on the blocking pool before the write lock is
/// taken; the lock only covers the uniqueness check and insert.
pub async fn create_identity(
    store: &RwLock<InMemoryStore>,
    username: &str,
    password: &str,
    display_name: &str,
) -> Result<User, StoreError> {
    let password = password.to_owned();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
    store
        .write()
        .await
        .insert_identity(username, password_hash, display_name)
}

#[derive(Default)]
pub struct InMemoryStore {
    users: HashMap<String, UserRecord>,
    /// normalised username -> user id
    usernames: HashMap<String, String>,
    threads: HashMap<String, Thread>,
    messages: HashMap<String, Vec<Message>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Identities
    // -------------------------------------------------------------------------

    /// Insert a user with an already-hashed password.
    pub fn insert_identity(
        &mut self,
        username: &str,
        password_hash: String,
        display_name: &str,
    ) -> Result<User, StoreError> {
        let username = normalize_username(username);
        if self.usernames.contains_key(&username) {
            return Err(StoreError::UsernameTaken);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.clone(),
            display_name: display_name.to_string(),
            created_at: Utc::now(),
        };

        self.usernames.insert(username, user.id.clone());
        self.users.insert(
            user.id.clone(),
            UserRecord {
                user: user.clone(),
                password_hash,
            },
        );
        Ok(user)
    }

    pub fn credential_check(&self, username: &str) -> CredentialCheck {
        let record = self
            .usernames
            .get(&normalize_username(username))
            .and_then(|id| self.users.get(id));
        match record {
            Some(record) => CredentialCheck {
                user: Some(record.user.clone()),
                password_hash: record.password_hash.clone(),
            },
            None => CredentialCheck {
                user: None,
                password_hash: DUMMY_HASH.to_string(),
            },
        }
    }

    // -------------------------------------------------------------------------
    // Threads
    // -------------------------------------------------------------------------

    pub fn thread_owner_of(&self, thread_id: &str) -> Option<&str> {
        self.threads
            .get(thread_id)
            .map(|thread| thread.owner_id.as_str())
    }

    pub fn create_thread(&mut self, owner_id: &str, title: &str) -> Thread {
        let now = Utc::now();
        let thread = Thread {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.threads.insert(thread.id.clone(), thread.clone());
        thread
    }

    /// Threads owned by `owner_id`, most recently updated first.
    pub fn list_threads(&self, owner_id: &str) -> Vec<Thread> {
        let mut threads: Vec<Thread> = self
            .threads
            .values()
            .filter(|thread| thread.owner_id == owner_id)
            .cloned()
            .collect();
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        threads
    }

    /// Delete a thread and its messages.
    pub fn delete_thread(&mut self, thread_id: &str) -> Result<(), StoreError> {
        self.threads
            .remove(thread_id)
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))?;
        self.messages.remove(thread_id);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Messages
    // -------------------------------------------------------------------------

    pub fn append_message(
        &mut self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, StoreError> {
        let thread = self
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))?;

        let message = Message {
            id: Uuid::new_v4().to_string(),
            thread_id: thread_id.to_string(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        thread.updated_at = message.created_at;
        self.messages
            .entry(thread_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    /// Messages of a thread in the order they were appended.
    pub fn list_messages(&self, thread_id: &str) -> Vec<Message> {
        self.messages.get(thread_id).cloned().unwrap_or_default()
    }
}
