use anyhow::{Context, Result};
use citybrief::{CityBriefConfig, CityPipeline};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = CityBriefConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    let city = std::env::args()
        .nth(1)
        .context("Usage: citybrief <city name>")?;

    let pipeline = CityPipeline::new(&config)?;
    let report = pipeline
        .run(&city)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
