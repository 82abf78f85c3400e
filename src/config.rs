/// Configuration management for the keyserver gateway
use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub service: ServiceConfig,
    pub gitlab: GitLabConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub version: String,
}

/// Outbound GitLab directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitLabConfig {
    /// Hostname of the GitLab instance, without scheme
    pub host: String,
    /// Static bearer token attached to every outbound call
    pub token: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GatewayResult<Self> {
        dotenv::dotenv().ok();

        let host = env::var("KEYSERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        // 11371 is the registered HKP port
        let port = env::var("KEYSERVER_PORT")
            .unwrap_or_else(|_| "11371".to_string())
            .parse()
            .map_err(|_| GatewayError::Config("Invalid port number".to_string()))?;
        let version = env::var("KEYSERVER_VERSION")
            .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        let gitlab_host = env::var("GITLAB_HOST")
            .map_err(|_| GatewayError::Config("GITLAB_HOST is required".to_string()))?;
        let gitlab_token = env::var("GITLAB_TOKEN")
            .map_err(|_| GatewayError::Config("GITLAB_TOKEN is required".to_string()))?;
        let timeout_secs = env::var("GITLAB_TIMEOUT_SECS")
            .unwrap_or_else(|_| "4".to_string())
            .parse()
            .map_err(|_| GatewayError::Config("Invalid GITLAB_TIMEOUT_SECS".to_string()))?;

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(GatewayConfig {
            service: ServiceConfig {
                host,
                port,
                version,
            },
            gitlab: GitLabConfig {
                host: gitlab_host,
                token: gitlab_token,
                timeout_secs,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> GatewayResult<()> {
        if self.gitlab.host.is_empty() {
            return Err(GatewayError::Config(
                "GitLab host cannot be empty".to_string(),
            ));
        }
        if self.gitlab.host.contains("://") {
            return Err(GatewayError::Config(
                "GitLab host must be a bare hostname, without scheme".to_string(),
            ));
        }
        if self.gitlab.token.is_empty() {
            return Err(GatewayError::Config(
                "GitLab token cannot be empty".to_string(),
            ));
        }
        if self.gitlab.timeout_secs == 0 {
            return Err(GatewayError::Config(
                "GitLab timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }

    /// Per-call timeout for outbound directory requests
    pub fn gitlab_timeout(&self) -> Duration {
        Duration::from_secs(self.gitlab.timeout_secs)
    }
}
