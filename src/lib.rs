//! Webhook receiver library.
//!
//! Accepts POSTed alert payloads on configured endpoints, restricts callers
//! by source IP, logs what arrived and acknowledges with JSON.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;
pub mod webhook;

pub use config::{ConfigLoader, WebhookConfig};
pub use http::WebhookServer;
pub use webhook::EndpointPolicy;
