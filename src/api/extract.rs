//! Extractors whose rejections use the gateway error body.

use axum::extract::{FromRequestParts, Query};

use crate::error::GatewayError;

/// `Query` whose rejection is reported as `INVALID_REQUEST`
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(GatewayError))]
pub struct ApiQuery<T>(pub T);
