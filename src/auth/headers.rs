// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transport headers for internal identity assertions.
//!
//! An assertion travels as five headers under one namespace:
//!
//! | Header | Content |
//! |--------|---------|
//! | `{ns}-user` | identity |
//! | `{ns}-ts` | unix seconds, decimal |
//! | `{ns}-sig` | base64url signature |
//! | `{ns}-method` | signed HTTP method |
//! | `{ns}-path` | signed request path |
//!
//! `x-internal` carries gatekeeper → handler assertions, `x-service` carries
//! service-to-service calls. Both are stripped from every inbound request.

use axum::http::{
    header::{HeaderName, InvalidHeaderValue},
    HeaderMap, HeaderValue,
};

use super::signature::SignedFields;

/// Header namespace for an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Gatekeeper → handler forwarding.
    Internal,
    /// Direct service-to-service calls.
    Service,
}

impl Namespace {
    pub const ALL: [Namespace; 2] = [Namespace::Internal, Namespace::Service];

    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Internal => "x-internal",
            Namespace::Service => "x-service",
        }
    }

    /// Header names in the order user, ts, sig, method, path.
    pub fn header_names(self) -> [HeaderName; 5] {
        let names: [&'static str; 5] = match self {
            Namespace::Internal => [
                "x-internal-user",
                "x-internal-ts",
                "x-internal-sig",
                "x-internal-method",
                "x-internal-path",
            ],
            Namespace::Service => [
                "x-service-user",
                "x-service-ts",
                "x-service-sig",
                "x-service-method",
                "x-service-path",
            ],
        };
        names.map(HeaderName::from_static)
    }
}

/// A complete assertion as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub identity: String,
    pub method: String,
    pub path: String,
    pub timestamp: i64,
    pub signature: String,
}

impl Assertion {
    pub fn signed_fields(&self) -> SignedFields<'_> {
        SignedFields {
            identity: &self.identity,
            method: &self.method,
            path: &self.path,
            timestamp: self.timestamp,
        }
    }
}

/// All five headers present, timestamp not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAssertion {
    pub identity: String,
    pub method: String,
    pub path: String,
    pub timestamp: String,
    pub signature: String,
}

impl RawAssertion {
    /// Parse the timestamp as a decimal integer.
    pub fn parse(self) -> Option<Assertion> {
        let timestamp = self.timestamp.trim().parse::<i64>().ok()?;
        Some(Assertion {
            identity: self.identity,
            method: self.method,
            path: self.path,
            timestamp,
            signature: self.signature,
        })
    }
}

/// Write the assertion's five headers, replacing existing values.
///
/// Fails if a field cannot be represented as a header value (control
/// characters); nothing is written in that case.
pub fn pack(
    headers: &mut HeaderMap,
    assertion: &Assertion,
    namespace: Namespace,
) -> Result<(), InvalidHeaderValue> {
    let timestamp = assertion.timestamp.to_string();
    let values = [
        HeaderValue::from_bytes(assertion.identity.as_bytes())?,
        HeaderValue::from_str(&timestamp)?,
        HeaderValue::from_str(&assertion.signature)?,
        HeaderValue::from_str(&assertion.method)?,
        HeaderValue::from_bytes(assertion.path.as_bytes())?,
    ];

    for (name, value) in namespace.header_names().into_iter().zip(values) {
        headers.insert(name, value);
    }
    Ok(())
}

/// Read all five headers of `namespace` without interpreting them.
///
/// Returns `None` if any header is missing or not UTF-8.
pub fn unpack_raw(headers: &HeaderMap, namespace: Namespace) -> Option<RawAssertion> {
    let [user, ts, sig, method, path] = namespace.header_names();
    let read = |name: &HeaderName| {
        headers
            .get(name)
            .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
            .map(str::to_string)
    };

    Some(RawAssertion {
        identity: read(&user)?,
        timestamp: read(&ts)?,
        signature: read(&sig)?,
        method: read(&method)?,
        path: read(&path)?,
    })
}

/// Read a complete assertion, or `None` if a header is missing or the
/// timestamp is not an integer.
pub fn unpack(headers: &HeaderMap, namespace: Namespace) -> Option<Assertion> {
    unpack_raw(headers, namespace)?.parse()
}

/// Remove every assertion header of both namespaces. Other headers are left
/// untouched.
pub fn strip(headers: &mut HeaderMap) {
    // `HeaderMap` stores names lower-cased, so removal by name is
    // case-insensitive.
    for namespace in Namespace::ALL {
        for name in namespace.header_names() {
            headers.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request};

    fn sample() -> Assertion {
        Assertion {
            identity: "user-123".to_string(),
            method: "POST".to_string(),
            path: "/api/chat".to_string(),
            timestamp: 1_700_000_000,
            signature: "2MrrmFw84VhPSdyuffN6WmEphd6RAqda3jhEXZg9ODw".to_string(),
        }
    }

    #[test]
    fn pack_then_unpack_round_trips() {
        for namespace in Namespace::ALL {
            let mut headers = HeaderMap::new();
            pack(&mut headers, &sample(), namespace).unwrap();
            assert_eq!(unpack(&headers, namespace), Some(sample()));
        }
    }

    #[test]
    fn pack_writes_namespaced_names() {
        let mut headers = HeaderMap::new();
        pack(&mut headers, &sample(), Namespace::Service).unwrap();

        assert_eq!(headers["x-service-user"], "user-123");
        assert_eq!(headers["x-service-ts"], "1700000000");
        assert_eq!(headers["x-service-method"], "POST");
        assert_eq!(headers["x-service-path"], "/api/chat");
        assert!(unpack(&headers, Namespace::Internal).is_none());
    }

    #[test]
    fn pack_overwrites_existing_values() {
        let mut headers = HeaderMap::new();
        headers.append("x-internal-user", HeaderValue::from_static("attacker"));
        headers.append("x-internal-user", HeaderValue::from_static("attacker-2"));

        pack(&mut headers, &sample(), Namespace::Internal).unwrap();

        let users: Vec<_> = headers.get_all("x-internal-user").iter().collect();
        assert_eq!(users, vec![&HeaderValue::from_static("user-123")]);
    }

    #[test]
    fn non_ascii_identity_survives_transport() {
        let mut assertion = sample();
        assertion.identity = "usér-ü".to_string();

        let mut headers = HeaderMap::new();
        pack(&mut headers, &assertion, Namespace::Internal).unwrap();
        assert_eq!(unpack(&headers, Namespace::Internal), Some(assertion));
    }

    #[test]
    fn pack_rejects_control_characters() {
        let mut assertion = sample();
        assertion.identity = "user\r\nx-internal-user: admin".to_string();

        let mut headers = HeaderMap::new();
        assert!(pack(&mut headers, &assertion, Namespace::Internal).is_err());
        assert!(headers.is_empty());
    }

    #[test]
    fn unpack_requires_all_five_headers() {
        for missing in Namespace::Internal.header_names() {
            let mut headers = HeaderMap::new();
            pack(&mut headers, &sample(), Namespace::Internal).unwrap();
            headers.remove(&missing);
            assert!(unpack(&headers, Namespace::Internal).is_none(), "{missing}");
            assert!(unpack_raw(&headers, Namespace::Internal).is_none());
        }
    }

    #[test]
    fn unpack_rejects_non_numeric_timestamp() {
        let mut headers = HeaderMap::new();
        pack(&mut headers, &sample(), Namespace::Internal).unwrap();
        headers.insert("x-internal-ts", HeaderValue::from_static("yesterday"));

        assert!(unpack(&headers, Namespace::Internal).is_none());
        let raw = unpack_raw(&headers, Namespace::Internal).unwrap();
        assert_eq!(raw.timestamp, "yesterday");
    }

    #[test]
    fn strip_removes_both_namespaces_case_insensitively() {
        // Names given in mixed case are normalised by the request builder.
        let request = Request::builder()
            .header("X-Internal-User", "a")
            .header("X-INTERNAL-TS", "1")
            .header("x-internal-SIG", "s")
            .header("X-Internal-Method", "GET")
            .header("X-Internal-Path", "/")
            .header("X-Service-User", "svc")
            .header("X-SERVICE-TS", "1")
            .header("X-Service-Sig", "s")
            .header("x-service-method", "GET")
            .header("X-Service-PATH", "/")
            .header(header::AUTHORIZATION, "Bearer abc")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-internal-other", "kept")
            .body(())
            .unwrap();
        let mut headers = request.into_parts().0.headers;

        strip(&mut headers);

        assert_eq!(headers.len(), 3);
        assert_eq!(headers[header::AUTHORIZATION], "Bearer abc");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers["x-internal-other"], "kept");
    }
}
