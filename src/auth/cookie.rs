// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session cookie handling.

use axum::http::{header, HeaderMap, HeaderValue};

use super::session::SESSION_TTL_SECS;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "auth-token";

/// Attributes applied to the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    /// Add the `Secure` attribute (HTTPS-only).
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { secure: true }
    }
}

impl CookieSettings {
    /// `Set-Cookie` value storing `token` for the session lifetime.
    pub fn session_cookie(&self, token: &str) -> Option<HeaderValue> {
        self.build(token, SESSION_TTL_SECS)
    }

    /// `Set-Cookie` value that deletes the session cookie.
    pub fn clear_cookie(&self) -> Option<HeaderValue> {
        self.build("", 0)
    }

    fn build(&self, value: &str, max_age: i64) -> Option<HeaderValue> {
        let secure = if self.secure { "; Secure" } else { "" };
        let cookie = format!(
            "{SESSION_COOKIE}={value}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age}{secure}"
        );
        HeaderValue::from_str(&cookie).ok()
    }
}

/// Extract the session token from the request's `Cookie` headers.
///
/// Returns the first non-empty `auth-token` value found.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim_matches('"'))
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookies(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn reads_token_among_other_cookies() {
        let headers = headers_with_cookies(&["theme=dark; auth-token=abc.def.ghi; lang=en"]);
        assert_eq!(session_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn reads_token_from_second_cookie_header() {
        let headers = headers_with_cookies(&["theme=dark", "auth-token=abc"]);
        assert_eq!(session_token(&headers), Some("abc"));
    }

    #[test]
    fn absent_or_empty_cookie_yields_none() {
        assert_eq!(session_token(&HeaderMap::new()), None);
        assert_eq!(session_token(&headers_with_cookies(&["auth-token="])), None);
        assert_eq!(
            session_token(&headers_with_cookies(&["not-auth-token=abc"])),
            None
        );
    }

    #[test]
    fn quoted_empty_cookie_is_absent() {
        assert_eq!(session_token(&headers_with_cookies(&[r#"auth-token="""#])), None);
        assert_eq!(
            session_token(&headers_with_cookies(&[r#"auth-token="""#, r#"auth-token="abc""#])),
            Some("abc")
        );
    }

    #[test]
    fn session_cookie_has_required_attributes() {
        let value = CookieSettings { secure: true }.session_cookie("tok").unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("auth-token=tok;"));
        for attribute in ["HttpOnly", "SameSite=Strict", "Path=/", "Max-Age=86400", "Secure"] {
            assert!(value.contains(attribute), "{value} lacks {attribute}");
        }
    }

    #[test]
    fn insecure_cookie_omits_secure() {
        let value = CookieSettings { secure: false }.session_cookie("tok").unwrap();
        assert!(!value.to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let value = CookieSettings::default().clear_cookie().unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("auth-token=;"));
        assert!(value.contains("Max-Age=0"));
    }
}
