//! HTTP-facing error type.
//!
//! Every failure leaves the service as `{"success": false, "error": "..."}`
//! with a status code chosen from the underlying error.

use crate::deploy::DeployError;
use crate::extractor::ExtractError;
use crate::payload::PayloadError;
use crate::retry::UpstreamError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Original input, echoed back when it could not be parsed.
    pub raw: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<&'a str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            raw: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// A required secret or setting is missing on the server.
    pub fn misconfigured(what: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Server configuration error: {what} not set"),
        )
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{} {}", self.status, self.message);
        }
        let body = ErrorBody {
            success: false,
            error: &self.message,
            raw: self.raw.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        let status = match &err {
            ExtractError::Validation(_) => StatusCode::BAD_REQUEST,
            ExtractError::Upstream(UpstreamError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ExtractError::Upstream(_) | ExtractError::Unparseable(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Data module could not be parsed: {err}"),
        )
    }
}

impl From<DeployError> for ApiError {
    fn from(err: DeployError) -> Self {
        match err {
            DeployError::Template { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            // The hosting platform's status is passed through.
            DeployError::Upstream(UpstreamError::Status { status, body }) => Self::new(
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                format!("Deployment failed: {body}"),
            ),
            DeployError::Upstream(UpstreamError::Timeout(_)) => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, format!("Deployment failed: {err}"))
            }
            DeployError::Upstream(other) => {
                Self::new(StatusCode::BAD_GATEWAY, format!("Deployment failed: {other}"))
            }
        }
    }
}
