use axum::{
    extract::rejection::{BytesRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::provider::ProviderError;
use crate::topic::TopicError;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Missing required parameters: {0:?}")]
    MissingParameter(Vec<String>),

    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error("Unknown device type: {0}")]
    UnknownDeviceType(String),

    #[error("Topic name already registered: {0}")]
    DuplicateName(String),

    #[error("No platform application configured for device type: {0}")]
    PlatformNotConfigured(String),

    #[error("Publish failed: {0}")]
    PublishFailed(#[source] ProviderError),

    #[error("Provider error: {0}")]
    Provider(#[source] ProviderError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request body exceeds the size limit")]
    PayloadTooLarge,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Stable error kind reported to callers
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::MissingParameter(_) => "MISSING_REQUIRED_PARAMETER",
            GatewayError::UnknownTopic(_) => "UNKNOWN_TOPIC",
            GatewayError::UnknownDeviceType(_) => "UNKNOWN_DEVICE_TYPE",
            GatewayError::DuplicateName(_) => "DUPLICATE_TOPIC_NAME",
            GatewayError::PlatformNotConfigured(_) => "PLATFORM_NOT_CONFIGURED",
            GatewayError::PublishFailed(_) => "PUBLISH_FAILED",
            GatewayError::Provider(_) => "PROVIDER_ERROR",
            GatewayError::InvalidRequest(_) => "INVALID_REQUEST",
            GatewayError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            GatewayError::Unauthorized => "UNAUTHORIZED",
            GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Offending field names or values. Provider and internal details are
    /// never included.
    pub fn info(&self) -> Vec<String> {
        match self {
            GatewayError::MissingParameter(fields) => fields.clone(),
            GatewayError::UnknownTopic(name) | GatewayError::DuplicateName(name) => {
                vec![name.clone()]
            }
            GatewayError::UnknownDeviceType(kind) | GatewayError::PlatformNotConfigured(kind) => {
                vec![kind.clone()]
            }
            GatewayError::InvalidRequest(reason) => vec![reason.clone()],
            _ => vec![],
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingParameter(_)
            | GatewayError::UnknownDeviceType(_)
            | GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::UnknownTopic(_) => StatusCode::NOT_FOUND,
            GatewayError::DuplicateName(_) => StatusCode::CONFLICT,
            GatewayError::PlatformNotConfigured(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::PublishFailed(_) | GatewayError::Provider(_) => StatusCode::BAD_GATEWAY,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TopicError> for GatewayError {
    fn from(err: TopicError) -> Self {
        match err {
            TopicError::NotFound(name) => GatewayError::UnknownTopic(name),
            TopicError::AlreadyExists(name) => GatewayError::DuplicateName(name),
            TopicError::Provider(e) => GatewayError::Provider(e),
        }
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::InvalidRequest(rejection.body_text())
    }
}

impl From<BytesRejection> for GatewayError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge
        } else {
            GatewayError::InvalidRequest(rejection.body_text())
        }
    }
}

/// Error body returned to callers
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub info: Vec<String>,
}

impl From<&GatewayError> for ErrorResponse {
    fn from(err: &GatewayError) -> Self {
        Self {
            error: err.kind().to_string(),
            info: err.info(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Always log the detailed error server-side
        if status.is_server_error() {
            tracing::error!(
                kind = %self.kind(),
                status = %status.as_u16(),
                error = %self,
                "Gateway error"
            );
        } else {
            tracing::warn!(
                kind = %self.kind(),
                status = %status.as_u16(),
                error = %self,
                "Request rejected"
            );
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Check that every named parameter is present and non-empty.
///
/// Returns the values in declaration order, or `MissingParameter` listing
/// every absent name.
pub fn require_params<'a, const N: usize>(
    params: [(&'static str, Option<&'a str>); N],
) -> Result<[&'a str; N]> {
    let missing: Vec<String> = params
        .iter()
        .filter(|(_, value)| value.map_or(true, str::is_empty))
        .map(|(name, _)| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(GatewayError::MissingParameter(missing));
    }

    Ok(params.map(|(_, value)| value.unwrap_or_default()))
}
