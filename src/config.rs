// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`AppConfig`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SESSION_SECRET` | Key for signing session tokens | Required |
//! | `INTERNAL_AUTH_SECRET` | Key for signing internal/service headers | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `COOKIE_SECURE` | Mark the session cookie `Secure` | `true` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{env, net::SocketAddr, path::PathBuf};

use crate::auth::secret::{require_secret, EnvSecret, SecretProvider};

/// Environment variable holding the session-token signing key.
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";

/// Environment variable holding the internal-header signing key.
///
/// Must differ from [`SESSION_SECRET_ENV`]; a leaked session key must not
/// allow forging gatekeeper assertions.
pub const INTERNAL_AUTH_SECRET_ENV: &str = "INTERNAL_AUTH_SECRET";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const COOKIE_SECURE_ENV: &str = "COOKIE_SECURE";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required secret {0} is missing or empty")]
    MissingSecret(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Paths to the PEM files used when serving HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Process configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,
    pub cookie_secure: bool,
    pub log_format: LogFormat,
    pub session_secret: String,
    pub internal_secret: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_providers(
            &EnvSecret::new(SESSION_SECRET_ENV),
            &EnvSecret::new(INTERNAL_AUTH_SECRET_ENV),
            |name| env::var(name).ok(),
        )
    }

    /// Build configuration from explicit secret providers and a variable
    /// lookup. `from_env` is this function over the real environment.
    pub fn from_providers(
        session: &dyn SecretProvider,
        internal: &dyn SecretProvider,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let session_secret = require_secret(session, SESSION_SECRET_ENV)?;
        let internal_secret = require_secret(internal, INTERNAL_AUTH_SECRET_ENV)?;

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: PORT_ENV,
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: HOST_ENV,
                    value: host.clone(),
                })?;

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::InvalidValue {
                    name: TLS_KEY_PATH_ENV,
                    value: String::new(),
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::InvalidValue {
                    name: TLS_CERT_PATH_ENV,
                    value: String::new(),
                })
            }
        };

        let cookie_secure = match lookup(COOKIE_SECURE_ENV) {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                name: COOKIE_SECURE_ENV,
                value: raw,
            })?,
            None => true,
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr,
            tls,
            cookie_secure,
            log_format,
            session_secret,
            internal_secret,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
