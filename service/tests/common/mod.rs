//! Common test utilities for integration tests.
//!
//! - [`http_mock::MockHttpServer`] - Stub the upstream post API over HTTP
//! - [`send_get`] - Drive the application router without a socket

#![allow(dead_code)]

pub mod http_mock;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

/// Send a GET through `app` and parse the JSON body (`Value::Null` if empty).
pub async fn send_get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let json = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
