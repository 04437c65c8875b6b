//! Gateway middleware

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::keycloak::KeycloakClient;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    /// Keycloak relay client
    pub keycloak: Arc<KeycloakClient>,
    /// Inbound API key (None = open gateway)
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(keycloak: KeycloakClient) -> Self {
        Self {
            keycloak: Arc::new(keycloak),
            api_key: None,
        }
    }

    /// Require an API key on `/users` routes; blank keys are ignored
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        if !key.trim().is_empty() {
            self.api_key = Some(key.into());
        }
        self
    }
}

/// API Key authentication middleware
///
/// Passes every request through when no key is configured.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    let authorized = matches!(
        extract_api_key(request.headers()),
        Some(key) if constant_time_eq(key, expected)
    );
    if authorized {
        return next.run(request).await;
    }

    tracing::warn!(
        path = %request.uri().path(),
        "Rejected request with missing or invalid API key"
    );
    let body = json!({
        "error": {
            "type": "authentication_error",
            "message": "Invalid or missing API key"
        }
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Extract API Key from request headers
///
/// Supports `x-api-key` first, then `Authorization: Bearer <token>`.
fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(key);
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// CORS middleware layer
///
/// Allows any origin, method and header, matching a browser-facing admin tool.
pub fn cors_layer() -> tower_http::cors::CorsLayer {
    use tower_http::cors::{Any, CorsLayer};

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
