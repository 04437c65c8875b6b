mod gateway;
mod http_client;
mod keycloak;
mod model;

use clap::Parser;
use gateway::AppState;
use http_client::ProxyConfig;
use keycloak::KeycloakClient;
use model::arg::Args;
use model::config::Config;

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Load configuration: file, then environment, then command line
    let config_path = args
        .config
        .unwrap_or_else(|| Config::default_config_path().to_string());
    let mut config = Config::load(&config_path)?;
    config.apply_env_overrides()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let credentials = config.credentials()?;
    tracing::info!(
        "Keycloak realm {} at {} (client {}, user {})",
        credentials.realm,
        credentials.base_url,
        credentials.client_id,
        credentials.username
    );

    let proxy_config = ProxyConfig::from_config(&config);
    if let Some(proxy) = &proxy_config {
        tracing::info!("HTTP proxy configured: {}", proxy.url);
    }

    let client = http_client::build_client(
        proxy_config.as_ref(),
        config.request_timeout_secs,
        config.tls_backend,
    )?;
    let keycloak = KeycloakClient::new(credentials, client);

    let mut state = AppState::new(keycloak);
    match config.effective_api_key() {
        Some(api_key) => {
            let visible: String = api_key.chars().take(api_key.chars().count() / 2).collect();
            tracing::info!("API Key: {}***", visible);
            state = state.with_api_key(api_key);
        }
        None => tracing::warn!("apiKey not set, /users routes are unauthenticated"),
    }

    let app = gateway::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting user management gateway: {}", addr);
    tracing::info!("Available APIs:");
    tracing::info!("  GET    /");
    tracing::info!("  GET    /users/");
    tracing::info!("  POST   /users/");
    tracing::info!("  PUT    /users/{{id}}");
    tracing::info!("  PUT    /users/{{id}}/enable");
    tracing::info!("  PUT    /users/{{id}}/disable");
    tracing::info!("  DELETE /users/{{id}}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    axum::serve(listener, app).await?;
    Ok(())
}
