//! Webhook admission subsystem.
//!
//! # Data Flow
//! ```text
//! WebhookConfig
//!     → policy.rs (one EndpointPolicy per endpoint, allow-lists parsed once)
//!     → handler.rs (per-request admission pipeline)
//!     → rejection.rs (terminal failures → HTTP status)
//! ```

pub mod handler;
pub mod policy;
pub mod rejection;

pub use handler::{handle_webhook, RemoteAddr, WebhookAck};
pub use policy::{build_policies, EndpointPolicy};
pub use rejection::Rejection;
