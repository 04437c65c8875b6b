//! Gateway routing configuration

use axum::{
    Router, middleware,
    routing::{get, put},
};

use super::{
    handlers::{
        create_user, delete_user, disable_user, enable_user, list_users, root, update_user,
    },
    middleware::{AppState, auth_middleware, cors_layer},
};

/// Create gateway router
///
/// # Endpoints
/// - `GET /` - Welcome message
/// - `GET /users/` - List users
/// - `POST /users/` - Create user
/// - `PUT /users/{id}` - Update user
/// - `DELETE /users/{id}` - Delete user
/// - `PUT /users/{id}/enable` - Enable user
/// - `PUT /users/{id}/disable` - Disable user
///
/// # Authentication
/// `/users` routes require the API key when one is configured:
/// - `x-api-key` header
/// - `Authorization: Bearer <token>` header
pub fn create_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/", get(list_users).post(create_user))
        .route("/users/{id}", put(update_user).delete(delete_user))
        .route("/users/{id}/enable", put(enable_user))
        .route("/users/{id}/disable", put(disable_user))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(root))
        .merge(user_routes)
        .layer(cors_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::keycloak::KeycloakClient;
    use crate::model::config::Credentials;

    const TOKEN_PATH: &str = "/realms/demo/protocol/openid-connect/token";
    const USERS_PATH: &str = "/admin/realms/demo/users";

    fn state_for(server: &MockServer) -> AppState {
        let credentials = Credentials {
            base_url: server.uri(),
            realm: "demo".to_string(),
            client_id: "admin-cli".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        AppState::new(KeycloakClient::new(Arc::new(credentials), reqwest::Client::new()))
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "test-token"})),
            )
            .mount(server)
            .await;
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn empty(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_welcome() {
        let server = MockServer::start().await;
        let app = create_router(state_for(&server));

        let (status, body) = send(app, empty("GET", "/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Welcome to the Keycloak User Management API");
    }

    #[tokio::test]
    async fn test_list_users_passthrough() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        let users = json!([{"id": "1", "username": "alice", "totp": false}]);
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(users.clone()))
            .mount(&server)
            .await;

        let app = create_router(state_for(&server));
        let (status, body) = send(app.clone(), empty("GET", "/users/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, users);

        let (status, _) = send(app, empty("GET", "/users")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_token_failure_status_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = create_router(state_for(&server));
        let (status, body) = send(app, empty("GET", "/users/")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "relay_error");
        assert_eq!(body["error"]["message"], "Could not fetch token");
        assert_eq!(body["error"]["upstreamStatus"], 401);
    }

    #[tokio::test]
    async fn test_create_user() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("POST"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let app = create_router(state_for(&server));
        let request = with_json(
            "POST",
            "/users/",
            json!({
                "username": "test",
                "enabled": true,
                "email": "test@example.com",
                "firstName": "Test",
                "lastName": "Test",
                "realmRoles": ["user"]
            }),
        );
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User created successfully.");
    }

    #[tokio::test]
    async fn test_create_user_invalid_body_not_relayed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = create_router(state_for(&server));
        let request = with_json("POST", "/users/", json!({"username": "test"}));
        let (status, _) = send(app, request).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_update_enable_disable_delete() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/u-1", USERS_PATH)))
            .and(body_json(json!({"enabled": false})))
            .respond_with(ResponseTemplate::new(204))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/u-1", USERS_PATH)))
            .and(body_json(json!({"enabled": true})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/u-1", USERS_PATH)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let app = create_router(state_for(&server));

        // Legacy `{id, enabled}` body is accepted, id ignored
        let request = with_json("PUT", "/users/u-1", json!({"id": "other", "enabled": false}));
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User updated successfully.");

        let (status, body) = send(app.clone(), empty("PUT", "/users/u-1/enable")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User enabled successfully.");

        let (status, body) = send(app.clone(), empty("PUT", "/users/u-1/disable")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User disabled successfully.");

        let (status, body) = send(app, empty("DELETE", "/users/u-1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User deleted successfully.");
    }

    #[tokio::test]
    async fn test_delete_missing_user_propagates_404() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/missing", USERS_PATH)))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "User not found"})),
            )
            .mount(&server)
            .await;

        let app = create_router(state_for(&server));
        let (status, body) = send(app, empty("DELETE", "/users/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Could not delete user");
    }

    #[tokio::test]
    async fn test_api_key_required_when_configured() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let app = create_router(state_for(&server).with_api_key("gateway-key"));

        let (status, body) = send(app.clone(), empty("GET", "/users/")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "authentication_error");

        // Root stays open
        let (status, _) = send(app.clone(), empty("GET", "/")).await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::builder()
            .uri("/users/")
            .header("x-api-key", "gateway-key")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_blank_api_key_leaves_gateway_open() {
        let server = MockServer::start().await;
        let state = state_for(&server).with_api_key("  ");
        assert!(state.api_key.is_none());
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let server = MockServer::start().await;
        let app = create_router(state_for(&server));

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/users/")
            .header(header::ORIGIN, "https://admin.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
