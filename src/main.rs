use ad_enhancer::utils::{logger, validation::Validate};
use ad_enhancer::{CliConfig, EnhancerError, EnrichmentOrchestrator};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.load_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };

    let input: serde_json::Value = match cli.read_input() {
        Ok(raw) if raw.trim().is_empty() => serde_json::Value::Null,
        Ok(raw) => serde_json::from_str(&raw)
            .map_err(|e| EnhancerError::invalid_request(format!("Input is invalid: {}", e)))
            .unwrap_or_else(|e| exit_with(e)),
        Err(e) => exit_with(e),
    };

    let orchestrator = EnrichmentOrchestrator::from_config(&config);
    let output = match orchestrator.enrich_value(input).await {
        Ok(output) => output,
        Err(e) => exit_with(e),
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(())
}

/// Client-side failures exit with 1, everything else with 2.
fn exit_with(err: EnhancerError) -> ! {
    let body = err.to_body();
    tracing::error!(
        "Enrichment failed (status {}, code {:?}): {}",
        body.status,
        body.code,
        body.message
    );
    eprintln!("❌ {}", body.message);

    let exit_code = if (400..500).contains(&body.status) { 1 } else { 2 };
    std::process::exit(exit_code);
}
