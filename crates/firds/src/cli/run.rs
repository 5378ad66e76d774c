use anyhow::{Context, Result};
use firds_core::{Pipeline, PipelineConfig, PipelineOutput};

use super::Cli;

/// Environment defaults with the command-line flags layered on top
pub fn config_from(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::from_env();
    if let Some(dir) = &cli.download_dir {
        config.download_dir.clone_from(dir);
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir.clone_from(dir);
    }
    if let Some(file_type) = &cli.file_type {
        config.file_type.clone_from(file_type);
    }
    config.link_position = usize::from(cli.position.saturating_sub(1));
    if let Some(timeout) = cli.timeout {
        config.network.request_timeout_seconds = timeout;
    }
    config
        .network
        .validate()
        .context("invalid network settings")?;
    Ok(config)
}

pub async fn run(cli: &Cli) -> Result<PipelineOutput> {
    let config = config_from(cli)?;
    let pipeline = Pipeline::new(config).context("failed to build HTTP client")?;
    let output = pipeline.run(&cli.url).await?;
    tracing::info!(
        "Processed {} record(s) from {} in {} ms",
        output.records,
        output.download_link,
        output.duration_ms
    );
    Ok(output)
}
