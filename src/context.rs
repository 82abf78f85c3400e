/// Application context and dependency injection
use crate::{
    config::GatewayConfig,
    directory::{Directory, GitLabDirectory},
    error::GatewayResult,
    resolver::KeyResolver,
};
use std::sync::Arc;

/// Application context holding the shared, read-only services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<GatewayConfig>,
    pub resolver: Arc<KeyResolver>,
}

impl AppContext {
    /// Create the context from configuration, wiring up the GitLab client
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        config.validate()?;

        let directory = GitLabDirectory::new(
            &config.gitlab.host,
            &config.gitlab.token,
            config.gitlab_timeout(),
        )?;

        Ok(Self::with_directory(config, Arc::new(directory)))
    }

    /// Create the context around an injected directory client
    pub fn with_directory(config: GatewayConfig, directory: Arc<dyn Directory>) -> Self {
        Self {
            config: Arc::new(config),
            resolver: Arc::new(KeyResolver::new(directory)),
        }
    }
}
