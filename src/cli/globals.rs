use crate::{
    api::{ApiClient, ApiConfig},
    auth::AuthClient,
    context::SessionContext,
    session::{FileStorage, SessionStore},
};
use anyhow::{Context, Result};
use directories::BaseDirs;
use std::{path::PathBuf, sync::Arc, time::Duration};

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, session_file: PathBuf) -> Self {
        Self {
            api_url,
            session_file,
            timeout: crate::api::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn store(&self) -> SessionStore {
        SessionStore::new(FileStorage::new(&self.session_file))
    }

    /// Wire store, transport and auth into a bootstrapped context.
    /// # Errors
    /// Returns an error if the API URL is invalid or the HTTP client cannot be built.
    pub fn context(&self) -> Result<SessionContext> {
        let store = self.store();
        let config = ApiConfig::new(self.api_url.clone()).with_timeout(self.timeout);
        let api = ApiClient::new(&config, Arc::new(store.clone()))
            .with_context(|| format!("invalid API configuration for {}", self.api_url))?;

        Ok(SessionContext::new(AuthClient::new(api, store)))
    }
}

/// `<config dir>/nota/session.json`
/// # Errors
/// Returns an error if the platform has no home directory.
pub fn default_session_file() -> Result<PathBuf> {
    let dirs = BaseDirs::new().context("unable to locate the user config directory")?;
    Ok(dirs.config_dir().join("nota").join("session.json"))
}
