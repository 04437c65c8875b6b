//! Keycloak request/response type definitions

use serde::{Deserialize, Deserializer, Serialize};

// ============ Password Grant ============

/// Password grant form body
#[derive(Debug, Serialize)]
pub struct PasswordGrantRequest<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub grant_type: &'static str,
}

/// Token endpoint response
///
/// The expiry is only logged: tokens are used once and dropped.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

// ============ Users ============

/// Create user request accepted from callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub enabled: bool,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Absent and `null` both mean no roles
    #[serde(default, deserialize_with = "null_as_empty")]
    pub realm_roles: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Update user request
///
/// `enabled` is required, profile fields are forwarded only when present.
/// Unknown fields (such as a legacy `id`) are ignored; the path id wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UpdateUserRequest {
    /// Payload that only toggles the enabled flag
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled,
            email: None,
            first_name: None,
            last_name: None,
        }
    }
}

/// Admin capabilities attached to every created user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccess {
    pub manage_group_membership: bool,
    pub view: bool,
    pub map_roles: bool,
    pub impersonate: bool,
    pub manage: bool,
}

impl Default for UserAccess {
    fn default() -> Self {
        Self {
            manage_group_membership: true,
            view: true,
            map_roles: true,
            impersonate: true,
            manage: true,
        }
    }
}

/// User representation sent to the admin API on creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRepresentation {
    #[serde(flatten)]
    pub user: CreateUserRequest,
    pub disableable_credential_types: Vec<String>,
    pub required_actions: Vec<String>,
    pub not_before: i64,
    pub access: UserAccess,
}

impl From<CreateUserRequest> for NewUserRepresentation {
    fn from(user: CreateUserRequest) -> Self {
        Self {
            user,
            disableable_credential_types: Vec::new(),
            required_actions: Vec::new(),
            not_before: 0,
            access: UserAccess::default(),
        }
    }
}

// ============ Common Responses ============

/// Operation success response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
