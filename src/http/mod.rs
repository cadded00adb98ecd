//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → webhook handler bound to the matched endpoint
//!     → Send JSON acknowledgement or error status
//! ```

pub mod server;

pub use server::{build_router, ServerError, WebhookServer};
