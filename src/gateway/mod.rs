//! User management gateway
//!
//! HTTP surface relaying user administration calls to Keycloak.
//!
//! # Usage
//! ```ignore
//! let state = AppState::new(keycloak_client).with_api_key(api_key);
//! let app = create_router(state);
//! ```

mod handlers;
mod middleware;
mod router;

pub use middleware::AppState;
pub use router::create_router;
