// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing secret accessors.
//!
//! Secrets are read through [`SecretProvider`] so that the session codec and
//! the header signer can be constructed against the real environment in
//! production and against fixed values in tests.

use std::env;

use crate::config::ConfigError;

/// Narrow accessor for a symmetric signing key.
pub trait SecretProvider: Send + Sync {
    /// Current value of the secret, or `None` if it is not configured.
    fn secret(&self) -> Option<String>;
}

/// Reads a secret from an environment variable on every call.
#[derive(Debug, Clone, Copy)]
pub struct EnvSecret {
    var: &'static str,
}

impl EnvSecret {
    pub const fn new(var: &'static str) -> Self {
        Self { var }
    }
}

impl SecretProvider for EnvSecret {
    fn secret(&self) -> Option<String> {
        env::var(self.var).ok()
    }
}

/// A fixed secret value.
#[derive(Clone)]
pub struct StaticSecret(Option<String>);

impl StaticSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Some(secret.into()))
    }

    /// A provider that never yields a secret.
    pub fn absent() -> Self {
        Self(None)
    }
}

impl SecretProvider for StaticSecret {
    fn secret(&self) -> Option<String> {
        self.0.clone()
    }
}

impl std::fmt::Debug for StaticSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSecret")
            .field("present", &self.0.is_some())
            .finish()
    }
}

/// Resolve a secret, treating absence and the empty string as fatal.
pub fn require_secret(
    provider: &dyn SecretProvider,
    name: &'static str,
) -> Result<String, ConfigError> {
    match provider.secret() {
        Some(secret) if !secret.is_empty() => Ok(secret),
        _ => Err(ConfigError::MissingSecret(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_secret_returns_value() {
        let secret = require_secret(&StaticSecret::new("k"), "TEST_SECRET").unwrap();
        assert_eq!(secret, "k");
    }

    #[test]
    fn require_secret_rejects_absent_and_empty() {
        assert!(matches!(
            require_secret(&StaticSecret::absent(), "TEST_SECRET"),
            Err(ConfigError::MissingSecret("TEST_SECRET"))
        ));
        assert!(matches!(
            require_secret(&StaticSecret::new(""), "TEST_SECRET"),
            Err(ConfigError::MissingSecret("TEST_SECRET"))
        ));
    }

    #[test]
    fn env_secret_reports_unset_variable() {
        let provider = EnvSecret::new("JOURNAL_TEST_SECRET_THAT_IS_NEVER_SET");
        assert!(provider.secret().is_none());
    }

    #[test]
    fn debug_does_not_print_secret() {
        let rendered = format!("{:?}", StaticSecret::new("hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
