//! Request body limits.
//!
//! # Responsibilities
//! - Read a request body into memory under a byte cap
//! - Distinguish "too large" from other read failures
//!
//! # Design Decisions
//! - Exactly `limit` bytes is accepted, one more is rejected
//! - The body is buffered whole; webhook payloads are small

use std::error::Error as StdError;

use axum::body::{Body, Bytes};
use http_body_util::{BodyExt, LengthLimitError, Limited};

/// Failure reading a capped body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Read(#[source] Box<dyn StdError + Send + Sync>),
}

/// Collect `body`, failing once more than `limit` bytes arrive.
///
/// `None` reads without a cap.
pub async fn read_body(body: Body, limit: Option<usize>) -> Result<Bytes, BodyError> {
    let Some(limit) = limit else {
        return body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(|e| BodyError::Read(Box::new(e)));
    };

    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if is_length_limit(&*e) => Err(BodyError::TooLarge { limit }),
        Err(e) => Err(BodyError::Read(e)),
    }
}

fn is_length_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
