//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → remote.rs (client IP from the remote address)
//!     → source.rs (endpoint allow-list check)
//!     → limits.rs (capped body read)
//!     → Pass to the webhook handler
//! ```
//!
//! # Design Decisions
//! - Fail closed: an unparsable remote address is rejected
//! - Allow-lists are parsed once, never per request

pub mod limits;
pub mod remote;
pub mod source;

pub use limits::{read_body, BodyError};
pub use remote::{client_ip, InvalidRemoteAddr};
pub use source::{AllowList, AllowedSource, InvalidSource};
