//! agora-reader - read service for debate topics and viewpoints
//!
//! Resolves configuration once at startup (fatal if anything required is
//! missing), then serves topic view models as JSON for the rendering layer.

use agora_common::config::{ConfigOverrides, StoreSettings, TomlConfig};
use agora_reader::{build_router, AppState};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments; each overrides the matching AGORA_* variable and TOML key
#[derive(Debug, Parser)]
#[command(name = "agora-reader", version, about = "Debate topic reader for a hosted record store")]
struct Cli {
    /// TOML config file (default: <config dir>/agora/agora-reader.toml)
    #[arg(long, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,

    /// Record store base identifier
    #[arg(long)]
    base_id: Option<String>,

    /// Topics table identifier
    #[arg(long)]
    topics_table: Option<String>,

    /// Viewpoints table identifier
    #[arg(long)]
    viewpoints_table: Option<String>,

    /// Record store API key
    #[arg(long)]
    api_key: Option<String>,

    /// Record store root URL
    #[arg(long)]
    api_url: Option<String>,

    /// Named view listing topics newest-first
    #[arg(long)]
    newest_view: Option<String>,

    /// Revalidation window in seconds
    #[arg(long)]
    revalidate_secs: Option<u64>,

    /// Linkage strategy: forward or back_reference
    #[arg(long)]
    linkage: Option<String>,

    /// Field carrying the link for the chosen strategy
    #[arg(long)]
    link_field: Option<String>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_id: self.base_id.clone(),
            topics_table: self.topics_table.clone(),
            viewpoints_table: self.viewpoints_table.clone(),
            api_key: self.api_key.clone(),
            api_url: self.api_url.clone(),
            newest_view: self.newest_view.clone(),
            revalidate_secs: self.revalidate_secs,
            linkage: self.linkage.clone(),
            link_field: self.link_field.clone(),
            bind_addr: self.bind.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let toml_config = TomlConfig::load_or_default(cli.config.as_deref())?;

    // Initialize tracing subscriber
    let level = toml_config.log_level(cli.log_level.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .init();

    info!(
        "Starting agora-reader v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let settings = StoreSettings::resolve(cli.overrides(), &toml_config)?;
    info!(
        base_id = %settings.base_id,
        topics_table = %settings.topics_table,
        viewpoints_table = %settings.viewpoints_table,
        linkage = ?settings.linkage,
        revalidate_secs = settings.revalidation.duration().as_secs(),
        "Configuration resolved"
    );

    let state = AppState::from_settings(&settings)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!("agora-reader listening on http://{}", settings.bind_addr);
    info!("Health check: http://{}/health", settings.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
