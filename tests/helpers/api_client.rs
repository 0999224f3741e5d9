// ABOUTME: In-process API client that drives an axum Router through tower's oneshot
// ABOUTME: Requests are built fluently; responses are buffered for status, header, and body checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use axum::body::{to_bytes, Body};
use axum::http::{header, request, HeaderMap, Method, Request, Response, StatusCode};
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower::ServiceExt;

/// Request under construction
pub struct ApiRequest {
    builder: request::Builder,
    body: Body,
}

impl ApiRequest {
    fn to(method: Method, path: &str) -> Self {
        Self {
            builder: Request::builder().method(method).uri(path),
            body: Body::empty(),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::to(Method::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::to(Method::POST, path)
    }

    #[allow(dead_code)]
    pub fn patch(path: &str) -> Self {
        Self::to(Method::PATCH, path)
    }

    #[allow(dead_code)]
    pub fn put(path: &str) -> Self {
        Self::to(Method::PUT, path)
    }

    #[allow(dead_code)]
    pub fn delete(path: &str) -> Self {
        Self::to(Method::DELETE, path)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// `Authorization: Token <token>`
    #[allow(dead_code)]
    pub fn token(self, token: &str) -> Self {
        self.header(header::AUTHORIZATION.as_str(), &format!("Token {token}"))
    }

    pub fn json<T: Serialize>(mut self, payload: &T) -> Self {
        let encoded = serde_json::to_vec(payload).expect("payload should serialize");
        self.builder = self
            .builder
            .header(header::CONTENT_TYPE, "application/json");
        self.body = Body::from(encoded);
        self
    }

    /// Run the request through the router and buffer the reply
    pub async fn send(self, app: Router) -> ApiResponse {
        let request = self.builder.body(self.body).expect("request should build");
        let response = app.oneshot(request).await.expect("router is infallible");
        ApiResponse::read(response).await
    }
}

/// Buffered response
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    async fn read(response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();
        let body = to_bytes(body, usize::MAX)
            .await
            .expect("body should be readable")
            .to_vec();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    pub const fn status(&self) -> u16 {
        self.status.as_u16()
    }

    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    pub fn json<T: DeserializeOwned>(self) -> T {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "body is not the expected JSON ({e}): {}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    #[allow(dead_code)]
    pub fn text(self) -> String {
        String::from_utf8(self.body).expect("body should be UTF-8")
    }

    /// Panics with the body when the status differs
    #[allow(dead_code)]
    pub fn assert_status(self, expected: u16) -> Self {
        assert_eq!(
            self.status(),
            expected,
            "unexpected status, body: {}",
            String::from_utf8_lossy(&self.body)
        );
        self
    }
}
