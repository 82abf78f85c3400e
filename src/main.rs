/// GitLab Keyserver - HKP lookup gateway
///
/// Answers HKP keyserver lookups by resolving identities and GPG key
/// material from a GitLab instance's user directory.
mod api;
mod config;
mod context;
mod directory;
mod error;
mod hkp;
mod keyring;
mod resolver;
mod server;

use anyhow::Context as _;
use config::GatewayConfig;
use context::AppContext;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gitlab_keyserver=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = GatewayConfig::from_env().context("loading configuration")?;

    // Create application context
    let ctx = AppContext::new(config).context("building gateway context")?;

    // Start server
    server::serve(ctx).await.context("running server")?;

    Ok(())
}
