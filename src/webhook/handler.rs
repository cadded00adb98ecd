//! Webhook admission handler.
//!
//! # Pipeline
//! ```text
//! request
//!     → endpoint label (name, path, or request path)
//!     → client IP from the remote address       ── 403 invalid remote address
//!     → endpoint allow-list                     ── 403 source not allowed
//!     → method is POST                          ── 405
//!     → capped body read                        ── 413 / 400
//!     → log received event, remote, headers, body
//!     → 200 {"status":"ok","endpoint":<label>}
//! ```
//!
//! Every step is terminal on failure. Requests share nothing mutable.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{request::Parts, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::observability::metrics;
use crate::security::{client_ip, read_body, BodyError};
use crate::webhook::policy::EndpointPolicy;
use crate::webhook::rejection::Rejection;

/// Raw remote address of the caller, e.g. `10.0.0.1:4312`.
///
/// Takes precedence over axum's `ConnectInfo` when present in the request
/// extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

/// Acknowledgement body for an accepted webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    pub endpoint: String,
}

/// Axum handler serving one endpoint.
pub async fn handle_webhook(
    State(policy): State<Arc<EndpointPolicy>>,
    request: Request,
) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let request_path = request.uri().path().to_string();
    let endpoint = policy.label(&request_path).to_string();

    match admit(&policy, &endpoint, &request_id, request).await {
        Ok(ack) => {
            metrics::record_admission(&endpoint, metrics::OUTCOME_ACCEPTED);
            (StatusCode::OK, Json(ack)).into_response()
        }
        Err(rejection) => {
            metrics::record_admission(&endpoint, rejection.outcome());
            rejection.into_response()
        }
    }
}

async fn admit(
    policy: &EndpointPolicy,
    endpoint: &str,
    request_id: &str,
    request: Request,
) -> Result<WebhookAck, Rejection> {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path();
    let remote = remote_addr(&parts);

    let ip = match client_ip(&remote) {
        Ok(ip) => ip,
        Err(_) => {
            tracing::warn!(
                request_id = %request_id,
                endpoint = %endpoint,
                path = %path,
                remote = ?remote,
                reason = %Rejection::InvalidRemoteAddr,
                "Webhook rejected"
            );
            return Err(Rejection::InvalidRemoteAddr);
        }
    };

    if !policy.allow_list.is_allowed(ip) {
        tracing::warn!(
            request_id = %request_id,
            endpoint = %endpoint,
            path = %path,
            remote = ?remote,
            client_ip = %ip,
            reason = %Rejection::SourceNotAllowed,
            "Webhook rejected"
        );
        return Err(Rejection::SourceNotAllowed);
    }

    if parts.method != Method::POST {
        tracing::debug!(request_id = %request_id, method = %parts.method, "Non-POST webhook request");
        return Err(Rejection::MethodNotAllowed);
    }

    let body = read_body(body, policy.max_body_bytes)
        .await
        .map_err(|e| {
            tracing::debug!(request_id = %request_id, error = %e, "Webhook body rejected");
            match e {
                BodyError::TooLarge { .. } => Rejection::BodyTooLarge,
                BodyError::Read(_) => Rejection::BodyRead,
            }
        })?;

    tracing::info!(
        request_id = %request_id,
        endpoint = %endpoint,
        method = %parts.method,
        path = %path,
        "Webhook received"
    );
    tracing::info!(request_id = %request_id, remote = %remote, client_ip = %ip, "Remote");
    if policy.log_headers {
        tracing::info!(request_id = %request_id, "Headers:\n{}", format_headers(&parts.headers));
    }
    if policy.log_body {
        tracing::info!(request_id = %request_id, "Body:\n{}", String::from_utf8_lossy(&body));
    }

    Ok(WebhookAck {
        status: "ok",
        endpoint: endpoint.to_string(),
    })
}

fn remote_addr(parts: &Parts) -> String {
    if let Some(RemoteAddr(raw)) = parts.extensions.get::<RemoteAddr>() {
        return raw.clone();
    }
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default()
}

/// One `name: value` line per header; repeated headers are comma-joined.
pub fn format_headers(headers: &HeaderMap) -> String {
    let mut out = String::new();
    for name in headers.keys() {
        let values: Vec<String> = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(&values.join(", "));
        out.push('\n');
    }
    out
}
