//! Keycloak relay module
//!
//! Talks to a Keycloak realm on behalf of callers using a fixed service
//! account: a password grant per operation, then one admin API call.
//!
//! # Usage
//! ```ignore
//! let credentials = config.credentials()?;
//! let client = build_client(proxy.as_ref(), config.request_timeout_secs, config.tls_backend)?;
//! let keycloak = KeycloakClient::new(credentials, client);
//! let users = keycloak.list_users().await?;
//! ```

mod client;
mod error;
mod token;
pub mod types;

pub use client::{KeycloakClient, UserOperation};
pub use error::RelayError;
