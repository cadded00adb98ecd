//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → plain HTTP (axum::serve), or
//!     → tls.rs (rustls handshake via axum-server)
//!     → Hand off to HTTP layer
//! ```

pub mod tls;

pub use tls::{TlsError, TlsFiles};
