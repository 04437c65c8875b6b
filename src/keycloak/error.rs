//! Relay error type

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Failure of a relayed operation
///
/// Carries the status reported by Keycloak (token endpoint or admin API),
/// or 502 when no usable downstream response was obtained.
#[derive(Debug)]
pub struct RelayError {
    status: StatusCode,
    message: String,
    /// Downstream response body, kept for logging only
    upstream_body: Option<String>,
}

impl RelayError {
    /// Downstream answered with an unexpected status
    pub fn upstream(
        status: StatusCode,
        message: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            upstream_body: Some(body.into()),
        }
    }

    /// No usable downstream response (transport failure, undecodable body)
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
            upstream_body: None,
        }
    }

    /// Status reported by the downstream service
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn upstream_body(&self) -> Option<&str> {
        self.upstream_body.as_deref()
    }

    /// HTTP status returned to the caller
    ///
    /// Downstream statuses below 400 never reach the caller as-is: a failed
    /// relay always answers with an error status.
    pub fn status_code(&self) -> StatusCode {
        if self.status.is_client_error() || self.status.is_server_error() {
            self.status
        } else {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.message(), self.status.as_u16())
    }
}

impl std::error::Error for RelayError {}

/// Error response body
#[derive(Debug, Serialize)]
pub struct RelayErrorResponse {
    pub error: RelayErrorBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub upstream_status: u16,
}

impl From<&RelayError> for RelayErrorResponse {
    fn from(err: &RelayError) -> Self {
        Self {
            error: RelayErrorBody {
                error_type: "relay_error".to_string(),
                message: err.message.clone(),
                upstream_status: err.status.as_u16(),
            },
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        tracing::debug!(
            upstream_status = %self.status,
            upstream_body = self.upstream_body().unwrap_or_default(),
            "Relay failed"
        );
        let body = RelayErrorResponse::from(&self);
        (self.status_code(), Json(body)).into_response()
    }
}
