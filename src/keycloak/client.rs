//! Keycloak admin API relay
//!
//! Every operation fetches its own token, performs exactly one admin call with
//! it and checks the status against the one Keycloak documents for success.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::model::config::Credentials;

use super::error::RelayError;
use super::token::fetch_token;
use super::types::{CreateUserRequest, NewUserRepresentation, UpdateUserRequest};

/// Relayed user operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOperation {
    List,
    Create,
    Update,
    Enable,
    Disable,
    Delete,
}

impl UserOperation {
    /// Status Keycloak answers with on success
    pub fn expected_status(self) -> StatusCode {
        match self {
            UserOperation::List => StatusCode::OK,
            UserOperation::Create => StatusCode::CREATED,
            UserOperation::Update
            | UserOperation::Enable
            | UserOperation::Disable
            | UserOperation::Delete => StatusCode::NO_CONTENT,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            UserOperation::List => "fetch",
            UserOperation::Create => "create",
            UserOperation::Update => "update",
            UserOperation::Enable => "enable",
            UserOperation::Disable => "disable",
            UserOperation::Delete => "delete",
        }
    }

    fn object(self) -> &'static str {
        match self {
            UserOperation::List => "users",
            _ => "user",
        }
    }

    /// Message reported when the relay fails
    pub fn failure_message(self) -> String {
        format!("Could not {} {}", self.verb(), self.object())
    }

    /// Message reported when the relay succeeds
    pub fn success_message(self) -> String {
        let past = match self {
            UserOperation::List => "fetched",
            UserOperation::Create => "created",
            UserOperation::Update => "updated",
            UserOperation::Enable => "enabled",
            UserOperation::Disable => "disabled",
            UserOperation::Delete => "deleted",
        };
        let object = match self {
            UserOperation::List => "Users",
            _ => "User",
        };
        format!("{} {} successfully.", object, past)
    }
}

/// Keycloak admin client relaying user operations with service credentials
#[derive(Clone)]
pub struct KeycloakClient {
    credentials: Arc<Credentials>,
    client: Client,
}

impl KeycloakClient {
    pub fn new(credentials: Arc<Credentials>, client: Client) -> Self {
        Self {
            credentials,
            client,
        }
    }

    /// List users, returning the admin API body untouched
    pub async fn list_users(&self) -> Result<Value, RelayError> {
        let op = UserOperation::List;
        let request = self.client.get(self.credentials.users_url());
        let response = self.relay(op, request).await?;

        let users: Value = response.json().await.map_err(|e| {
            tracing::error!("Failed to decode users response: {}", e);
            RelayError::bad_gateway(op.failure_message())
        })?;

        tracing::info!("{}", op.success_message());
        Ok(users)
    }

    /// Create a user with the fixed administrative defaults
    pub async fn create_user(&self, user: CreateUserRequest) -> Result<(), RelayError> {
        let op = UserOperation::Create;
        tracing::debug!(username = %user.username, "Creating user");
        let payload = NewUserRepresentation::from(user);
        self.send_json(op, Method::POST, self.credentials.users_url(), &payload)
            .await
    }

    /// Apply a partial update to a user
    pub async fn update_user(
        &self,
        user_id: &str,
        update: &UpdateUserRequest,
    ) -> Result<(), RelayError> {
        self.send_json(
            UserOperation::Update,
            Method::PUT,
            self.credentials.user_url(user_id),
            update,
        )
        .await
    }

    pub async fn enable_user(&self, user_id: &str) -> Result<(), RelayError> {
        self.set_enabled(UserOperation::Enable, user_id, true).await
    }

    pub async fn disable_user(&self, user_id: &str) -> Result<(), RelayError> {
        self.set_enabled(UserOperation::Disable, user_id, false).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), RelayError> {
        let op = UserOperation::Delete;
        let request = self.client.delete(self.credentials.user_url(user_id));
        self.relay(op, request).await?;
        tracing::info!(user_id = %user_id, "{}", op.success_message());
        Ok(())
    }

    async fn set_enabled(
        &self,
        op: UserOperation,
        user_id: &str,
        enabled: bool,
    ) -> Result<(), RelayError> {
        let payload = UpdateUserRequest::enabled(enabled);
        self.send_json(op, Method::PUT, self.credentials.user_url(user_id), &payload)
            .await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        op: UserOperation,
        method: Method,
        url: String,
        payload: &T,
    ) -> Result<(), RelayError> {
        let request = self.client.request(method, url).json(payload);
        self.relay(op, request).await?;
        tracing::info!("{}", op.success_message());
        Ok(())
    }

    /// Fetch a token, attach it to `request` and send it once
    ///
    /// A token failure returns before `request` is sent.
    async fn relay(
        &self,
        op: UserOperation,
        request: RequestBuilder,
    ) -> Result<Response, RelayError> {
        let token = fetch_token(&self.client, &self.credentials).await?;

        let response = request.bearer_auth(&token).send().await.map_err(|e| {
            tracing::error!("Failed to {} {}: {}", op.verb(), op.object(), e);
            RelayError::bad_gateway(op.failure_message())
        })?;

        let status = response.status();
        if status != op.expected_status() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                "Failed to {} {}: {}",
                op.verb(),
                op.object(),
                body
            );
            return Err(RelayError::upstream(status, op.failure_message(), body));
        }

        Ok(response)
    }
}
