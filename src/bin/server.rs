use ad_enhancer::api::build_router;
use ad_enhancer::utils::{logger, validation::Validate};
use ad_enhancer::{EnhancerConfig, EnrichmentOrchestrator};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ad-enhancer-server")]
#[command(about = "Serve ad request enrichment over HTTP")]
struct ServerArgs {
    #[arg(long, help = "TOML configuration file (environment variables when omitted)")]
    config: Option<PathBuf>,

    #[arg(long, help = "Override the listening port")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    logger::init_server_logger();

    let mut config = match &args.config {
        Some(path) => EnhancerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EnhancerConfig::from_env().context("loading configuration from environment")?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("validating configuration")?;

    let app = build_router(EnrichmentOrchestrator::from_config(&config));
    let addr = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("Ad enhancer listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
