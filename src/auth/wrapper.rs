// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Direct session verification for handlers that can read the cookie.
//!
//! Two entry points share [`authenticate_session`]:
//!
//! - [`with_session`] wraps a handler function so that it only runs for a
//!   verified session:
//!
//!   ```rust,ignore
//!   async fn list_for(user: SessionUser, state: AppState) -> Json<Vec<Thread>> { .. }
//!
//!   with_session(state.sessions.clone(), list_for).call(&headers, state).await
//!   ```
//!
//! - [`SessionAuth`] is the same check as an axum extractor.

use std::{future::Future, sync::Arc};

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use super::{cookie::session_token, session::SessionCodec, AuthError};
use crate::state::AppState;

/// The caller behind a verified session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub identity: String,
    pub display_name: String,
}

/// Verify the session cookie on `headers`.
///
/// No cookie is `MissingSession`; a cookie that fails verification for any
/// reason is `InvalidSession`.
pub fn authenticate_session(
    sessions: &SessionCodec,
    headers: &HeaderMap,
) -> Result<SessionUser, AuthError> {
    let token = session_token(headers).ok_or(AuthError::MissingSession)?;
    let payload = sessions.verify(token).map_err(|e| {
        tracing::debug!(reason = %e, "Session token rejected");
        AuthError::InvalidSession
    })?;
    Ok(SessionUser {
        identity: payload.identity,
        display_name: payload.display_name,
    })
}

/// A handler guarded by session verification. Built by [`with_session`].
#[derive(Clone)]
pub struct SessionGuard<H> {
    sessions: Arc<SessionCodec>,
    handler: H,
}

/// Wrap `handler` so it is only invoked with a verified [`SessionUser`].
pub fn with_session<H>(sessions: Arc<SessionCodec>, handler: H) -> SessionGuard<H> {
    SessionGuard { sessions, handler }
}

impl<H> SessionGuard<H> {
    /// Authenticate from `headers`, then run the handler with `input`.
    ///
    /// Authentication failures return `Err` without calling the handler.
    /// Whatever the handler returns, errors included, is passed back as is.
    pub async fn call<I, Fut, R>(&self, headers: &HeaderMap, input: I) -> Result<R, AuthError>
    where
        H: Fn(SessionUser, I) -> Fut,
        Fut: Future<Output = R>,
    {
        let user = authenticate_session(&self.sessions, headers)?;
        Ok((self.handler)(user, input).await)
    }
}

/// Extractor requiring a valid session cookie.
pub struct SessionAuth(pub SessionUser);

impl FromRequestParts<AppState> for SessionAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate_session(&state.sessions, &parts.headers).map(SessionAuth)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::auth::secret::StaticSecret;
    use axum::http::{header, HeaderValue};

    fn codec() -> Arc<SessionCodec> {
        Arc::new(SessionCodec::new(&StaticSecret::new("session-secret")).unwrap())
    }

    fn cookie_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("auth-token={token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn missing_cookie_never_calls_handler() {
        let calls = AtomicUsize::new(0);
        let guard = with_session(codec(), |_user: SessionUser, _: ()| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {}
        });

        let result = guard.call(&HeaderMap::new(), ()).await;

        assert_eq!(result, Err(AuthError::MissingSession));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_cookie_never_calls_handler() {
        let calls = AtomicUsize::new(0);
        let guard = with_session(codec(), |_user: SessionUser, _: ()| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {}
        });

        let result = guard.call(&cookie_headers("forged.token.value"), ()).await;

        assert_eq!(result, Err(AuthError::InvalidSession));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn quoted_empty_cookie_is_missing_session() {
        assert_eq!(
            authenticate_session(&codec(), &cookie_headers(r#""""#)),
            Err(AuthError::MissingSession)
        );
    }

    #[tokio::test]
    async fn valid_cookie_passes_identity_and_input() {
        let sessions = codec();
        let token = sessions.create("user-123", "Ada").unwrap();
        let guard = with_session(sessions, |user: SessionUser, suffix: &'static str| async move {
            format!("{}:{}:{suffix}", user.identity, user.display_name)
        });

        let result = guard.call(&cookie_headers(&token), "ok").await;
        assert_eq!(result, Ok("user-123:Ada:ok".to_string()));
    }

    #[tokio::test]
    async fn handler_errors_propagate_unchanged() {
        #[derive(Debug, PartialEq)]
        struct BusinessError(&'static str);

        let sessions = codec();
        let token = sessions.create("user-123", "Ada").unwrap();
        let guard = with_session(sessions, |_user: SessionUser, _: ()| async {
            Err::<(), _>(BusinessError("thread not found"))
        });

        let result = guard.call(&cookie_headers(&token), ()).await;
        assert_eq!(result, Ok(Err(BusinessError("thread not found"))));
    }

    #[tokio::test]
    async fn extractor_uses_same_check() {
        let state = AppState::for_tests();
        let token = state.sessions.create("user-9", "Grace").unwrap();
        let mut parts = axum::http::Request::builder()
            .header(header::COOKIE, format!("auth-token={token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let SessionAuth(user) = SessionAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(user.identity, "user-9");
        assert_eq!(user.display_name, "Grace");
    }
}
