//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use tower::ServiceExt;

use webhook_receiver::http::build_router;
use webhook_receiver::webhook::{build_policies, EndpointPolicy, RemoteAddr};
use webhook_receiver::WebhookConfig;

/// Router for a whole configuration.
pub fn router_for(config: &WebhookConfig) -> Router {
    build_router(build_policies(config).expect("valid policies"))
}

/// Router serving a single policy.
pub fn router_with(policy: EndpointPolicy) -> Router {
    build_router(vec![policy])
}

/// Build a request arriving from `remote`.
pub fn request_from(method: Method, uri: &str, remote: &str, body: impl Into<Body>) -> Request<Body> {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .unwrap();
    request
        .extensions_mut()
        .insert(RemoteAddr(remote.to_string()));
    request
}

/// Drive one request through the router.
pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

/// Collect a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
