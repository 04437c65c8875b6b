//! Password grant token exchange

use reqwest::{Client, StatusCode};

use crate::model::config::Credentials;

use super::error::RelayError;
use super::types::{PasswordGrantRequest, TokenResponse};

/// Exchange the service credentials for a fresh bearer token
///
/// Called once per relayed operation; the token is never cached.
pub(crate) async fn fetch_token(
    client: &Client,
    credentials: &Credentials,
) -> Result<String, RelayError> {
    let form = PasswordGrantRequest {
        client_id: &credentials.client_id,
        username: &credentials.username,
        password: &credentials.password,
        grant_type: "password",
    };

    let response = client
        .post(credentials.token_url())
        .form(&form)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch token: {}", e);
            RelayError::bad_gateway("Could not fetch token")
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, "Failed to fetch token: {}", body);
        return Err(RelayError::upstream(status, "Could not fetch token", body));
    }

    let data: TokenResponse = response.json().await.map_err(|e| {
        tracing::error!("Token response could not be decoded: {}", e);
        RelayError::bad_gateway("Could not fetch token")
    })?;

    tracing::info!(expires_in = ?data.expires_in, "Token fetched successfully.");
    Ok(data.access_token)
}
