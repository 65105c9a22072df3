//! Request body limits.
//!
//! Streaming bodies are never limited; only bodies the gateway has to hold in
//! memory (JSON normalization, redirect replay) are collected under
//! `limits.max_body_size`, answering 413 when exceeded.

use axum::body::{Body, Bytes};
use http_body_util::{BodyExt, LengthLimitError, Limited};

use crate::error::GatewayError;

/// Collect `body` into memory, failing with `PayloadTooLarge` past `max` bytes.
pub async fn collect_limited(body: Body, max: usize) -> Result<Bytes, GatewayError> {
    match Limited::new(body, max).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(GatewayError::PayloadTooLarge)
        }
        Err(e) => Err(GatewayError::MalformedBody(e.to_string())),
    }
}
