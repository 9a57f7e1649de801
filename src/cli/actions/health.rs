use crate::{
    api::{Anonymous, ApiClient, ApiConfig},
    cli::globals::GlobalArgs,
};
use anyhow::{Context, Result};
use std::sync::Arc;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

/// Probe `/health` without credentials.
/// # Errors
/// Returns an error if the API is unreachable or unhealthy.
pub async fn execute(args: &Args) -> Result<String> {
    let config = ApiConfig::new(args.globals.api_url.clone()).with_timeout(args.globals.timeout);
    let api = ApiClient::new(&config, Arc::new(Anonymous))?;

    let health = api
        .health()
        .await
        .with_context(|| format!("health check against {} failed", api.base_url()))?;

    Ok(format!("{}: {}", api.base_url(), health.status))
}
