// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client for trusted service-to-service calls.
//!
//! Background workers (summarisers, assistant replies) call the API on behalf
//! of a user without holding their session cookie. Each request carries an
//! `x-service-*` assertion signed with the internal secret and bound to the
//! request's method and path; the gatekeeper accepts it for at most
//! [`MAX_ASSERTION_AGE_SECS`](crate::auth::MAX_ASSERTION_AGE_SECS) seconds.

use std::time::Duration;

use chrono::Utc;
use reqwest::{header::InvalidHeaderValue, Client, Method, Request};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::{
    headers::{pack, Assertion, Namespace},
    HeaderSigner, SignedFields,
};
use crate::models::{CreateMessageRequest, Message};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ServiceClientError {
    #[error("invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("identity cannot be sent as a header: {0}")]
    InvalidIdentity(#[from] InvalidHeaderValue),

    #[error("service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service responded with {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
    signer: HeaderSigner,
}

impl ServiceClient {
    pub fn new(base_url: &str, signer: HeaderSigner) -> Result<Self, ServiceClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            signer,
        })
    }

    /// Build a request to `path` signed for `identity` at time `now`.
    ///
    /// The signed path is the URL path after joining with the base URL, which
    /// is what the gatekeeper sees.
    pub fn signed_request(
        &self,
        method: Method,
        path: &str,
        identity: &str,
        now: i64,
    ) -> Result<Request, ServiceClientError> {
        let url = self.base_url.join(path)?;
        let signature = self.signer.sign(&SignedFields {
            identity,
            method: method.as_str(),
            path: url.path(),
            timestamp: now,
        });
        let assertion = Assertion {
            identity: identity.to_string(),
            method: method.as_str().to_string(),
            path: url.path().to_string(),
            timestamp: now,
            signature,
        };

        let mut request = Request::new(method, url);
        pack(request.headers_mut(), &assertion, Namespace::Service)?;
        Ok(request)
    }

    async fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T, ServiceClientError> {
        let url = request.url().clone();
        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "Service call rejected");
            return Err(ServiceClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Messages of `thread_id`, as seen by `identity`.
    pub async fn list_messages(
        &self,
        identity: &str,
        thread_id: &str,
    ) -> Result<Vec<Message>, ServiceClientError> {
        let path = format!("/api/threads/{thread_id}/messages");
        let request = self.signed_request(Method::GET, &path, identity, Utc::now().timestamp())?;
        self.send(request).await
    }

    /// Append a message to `thread_id` on behalf of `identity`.
    pub async fn post_message(
        &self,
        identity: &str,
        thread_id: &str,
        message: &CreateMessageRequest,
    ) -> Result<Message, ServiceClientError> {
        let path = format!("/api/threads/{thread_id}/messages");
        let request = self.signed_request(Method::POST, &path, identity, Utc::now().timestamp())?;
        let request = reqwest::RequestBuilder::from_parts(self.http.clone(), request)
            .json(message)
            .build()?;
        self.send(request).await
    }
}
