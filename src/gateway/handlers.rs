//! Gateway handler functions

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;

use crate::keycloak::RelayError;
use crate::keycloak::UserOperation;
use crate::keycloak::types::{CreateUserRequest, MessageResponse, UpdateUserRequest};

use super::middleware::AppState;

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to the Keycloak User Management API"))
}

/// GET /users/
///
/// Returns the Keycloak user list verbatim
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Value>, RelayError> {
    tracing::info!("Received GET /users request");
    let users = state.keycloak.list_users().await?;
    Ok(Json(users))
}

/// POST /users/
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<MessageResponse>, RelayError> {
    tracing::info!(
        username = %payload.username,
        role_count = %payload.realm_roles.len(),
        "Received POST /users request"
    );
    state.keycloak.create_user(payload).await?;
    Ok(done(UserOperation::Create))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, RelayError> {
    tracing::info!(user_id = %id, enabled = %payload.enabled, "Received PUT /users/{{id}} request");
    state.keycloak.update_user(&id, &payload).await?;
    Ok(done(UserOperation::Update))
}

/// PUT /users/{id}/enable
pub async fn enable_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, RelayError> {
    tracing::info!(user_id = %id, "Received PUT /users/{{id}}/enable request");
    state.keycloak.enable_user(&id).await?;
    Ok(done(UserOperation::Enable))
}

/// PUT /users/{id}/disable
pub async fn disable_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, RelayError> {
    tracing::info!(user_id = %id, "Received PUT /users/{{id}}/disable request");
    state.keycloak.disable_user(&id).await?;
    Ok(done(UserOperation::Disable))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, RelayError> {
    tracing::info!(user_id = %id, "Received DELETE /users/{{id}} request");
    state.keycloak.delete_user(&id).await?;
    Ok(done(UserOperation::Delete))
}

fn done(op: UserOperation) -> Json<MessageResponse> {
    Json(MessageResponse::new(op.success_message()))
}
