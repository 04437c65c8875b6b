use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TlsBackend {
    Rustls,
    NativeTls,
}

impl Default for TlsBackend {
    fn default() -> Self {
        Self::Rustls
    }
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Keycloak base URL, e.g. `https://sso.example.com`
    #[serde(default)]
    pub keycloak_url: Option<String>,

    #[serde(default)]
    pub realm: Option<String>,

    /// Client used for the password grant
    #[serde(default)]
    pub client_id: Option<String>,

    /// Service account username for the password grant
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing)]
    pub password: Option<String>,

    #[serde(default)]
    pub tls_backend: TlsBackend,

    /// Downstream request timeout in seconds (unset = transport default)
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// HTTP proxy URL (optional)
    /// Supported formats: http://host:port, https://host:port, socks5://host:port
    #[serde(default)]
    pub proxy_url: Option<String>,

    #[serde(default)]
    pub proxy_username: Option<String>,

    #[serde(default)]
    pub proxy_password: Option<String>,

    /// Inbound API key protecting `/users` (optional)
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            keycloak_url: None,
            realm: None,
            client_id: None,
            username: None,
            password: None,
            tls_backend: TlsBackend::default(),
            request_timeout_secs: None,
            proxy_url: None,
            proxy_username: None,
            proxy_password: None,
            api_key: None,
        }
    }
}

/// Service credentials used for every token exchange
///
/// Loaded once at startup and shared read-only for the process lifetime.
#[derive(Clone)]
pub struct Credentials {
    /// Base URL without trailing slash
    pub base_url: String,
    pub realm: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// Password grant endpoint of the configured realm
    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base_url, self.realm
        )
    }

    /// Admin users collection of the configured realm
    pub fn users_url(&self) -> String {
        format!("{}/admin/realms/{}/users", self.base_url, self.realm)
    }

    /// Admin URL of a single user, id percent-encoded
    pub fn user_url(&self, user_id: &str) -> String {
        format!("{}/{}", self.users_url(), urlencoding::encode(user_id))
    }
}

/// Load a `.env` file into the process environment
///
/// `None` searches the working directory and its parents. A missing file is not an error.
fn load_dotenv(path: Option<&Path>) -> anyhow::Result<()> {
    let result = match path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match result {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => {
            tracing::debug!("No .env file found");
            Ok(())
        }
        Err(e) => Err(e).context("Failed to load .env file"),
    }
}

impl Config {
    /// Get default config file path
    pub fn default_config_path() -> &'static str {
        "config.json"
    }

    /// Load configuration from file
    ///
    /// A missing file yields the default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first;
    /// variables already set in the environment take precedence over it.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        load_dotenv(None)?;
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("KEYCLOAK_URL") {
            self.keycloak_url = Some(v);
        }
        if let Some(v) = get("REALM") {
            self.realm = Some(v);
        }
        if let Some(v) = get("CLIENT_ID") {
            self.client_id = Some(v);
        }
        if let Some(v) = get("USERNAME") {
            self.username = Some(v);
        }
        if let Some(v) = get("PASSWORD") {
            self.password = Some(v);
        }
        if let Some(v) = get("HOST") {
            self.host = v;
        }
        if let Some(v) = get("PORT") {
            self.port = v
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", v))?;
        }
        Ok(())
    }

    /// Validate the Keycloak settings and freeze them into `Credentials`
    pub fn credentials(&self) -> anyhow::Result<Arc<Credentials>> {
        fn required(value: &Option<String>, name: &str) -> anyhow::Result<String> {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                _ => bail!("{} not set in config file or environment", name),
            }
        }

        let base_url = required(&self.keycloak_url, "keycloakUrl")?;

        Ok(Arc::new(Credentials {
            base_url: base_url.trim_end_matches('/').to_string(),
            realm: required(&self.realm, "realm")?,
            client_id: required(&self.client_id, "clientId")?,
            username: required(&self.username, "username")?,
            // Taken verbatim, not trimmed
            password: match self.password.as_deref() {
                Some(p) if !p.is_empty() => p.to_string(),
                _ => bail!("password not set in config file or environment"),
            },
        }))
    }

    /// Inbound API key, treating a blank value as not configured
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}
