use clap::Parser;

/// REST facade for Keycloak user administration
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listen address (overrides config and HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides config and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}
