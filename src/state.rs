// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{CookieSettings, HeaderSigner, SecretProvider, SessionCodec, StaticSecret};
use crate::config::{AppConfig, ConfigError};
use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub sessions: Arc<SessionCodec>,
    pub signer: HeaderSigner,
    pub cookies: CookieSettings,
}

impl AppState {
    /// Build state from explicit secret providers.
    pub fn new(
        store: InMemoryStore,
        session_secret: &dyn SecretProvider,
        internal_secret: &dyn SecretProvider,
        cookies: CookieSettings,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            store: Arc::new(RwLock::new(store)),
            sessions: Arc::new(SessionCodec::new(session_secret)?),
            signer: HeaderSigner::new(internal_secret)?,
            cookies,
        })
    }

    /// Build state from loaded configuration.
    pub fn from_config(config: &AppConfig, store: InMemoryStore) -> Result<Self, ConfigError> {
        Self::new(
            store,
            &StaticSecret::new(config.session_secret.clone()),
            &StaticSecret::new(config.internal_secret.clone()),
            CookieSettings {
                secure: config.cookie_secure,
            },
        )
    }

    /// Empty store with fixed secrets, for tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::new(
            InMemoryStore::new(),
            &StaticSecret::new("test-session-secret"),
            &StaticSecret::new("test-internal-secret"),
            CookieSettings::default(),
        )
        .unwrap()
    }
}
