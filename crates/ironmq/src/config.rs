//! Client configuration: credentials, endpoint selection and HTTP settings.
//!
//! Configuration can be built in code or loaded with [`ClientConfig::load`]
//! from an optional `iron.json`-style file followed by `IRON_*` environment
//! variables (later sources override earlier ones):
//!
//! ```json
//! { "project_id": "4ffa...", "token": "...", "host": "mq-aws-us-east-1.iron.io" }
//! ```
//!
//! `IRON_PROJECT_ID`, `IRON_TOKEN`, `IRON_HOST`, `IRON_PORT`, `IRON_SCHEME`,
//! `IRON_API_VERSION` and `IRON_TIMEOUT_SECS` map onto the same keys.

use crate::error::ConfigurationError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// REST API version spoken by this client
pub const DEFAULT_API_VERSION: u32 = 1;

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const ENV_PREFIX: &str = "IRON";

/// Endpoint hosting the queues of a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cloud {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Cloud {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// IronMQ on AWS us-east-1
    pub fn aws_us_east() -> Self {
        Self::new("https", "mq-aws-us-east-1.iron.io", 443)
    }

    /// IronMQ on Rackspace DFW
    pub fn rackspace_dfw() -> Self {
        Self::new("https", "mq-rackspace-dfw.iron.io", 443)
    }
}

impl Default for Cloud {
    fn default() -> Self {
        Self::aws_us_east()
    }
}

/// Configuration for [`Client`](crate::client::Client) initialization
#[derive(Clone)]
pub struct ClientConfig {
    pub project_id: String,
    pub token: String,
    pub cloud: Cloud,
    pub api_version: u32,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Create configuration for a project on the default cloud
    pub fn new(project_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            token: token.into(),
            cloud: Cloud::default(),
            api_version: DEFAULT_API_VERSION,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("ironmq-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_cloud(mut self, cloud: Cloud) -> Self {
        self.cloud = cloud;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Base URL every queue path is resolved against, with trailing slash.
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}:{}/{}/projects/{}/",
            self.cloud.scheme,
            self.cloud.host,
            self.cloud.port,
            self.api_version,
            urlencoding::encode(&self.project_id)
        )
    }

    /// Check that credentials and endpoint are usable
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigurationError::Missing {
                key: "project_id".to_string(),
            });
        }
        if self.token.trim().is_empty() {
            return Err(ConfigurationError::Missing {
                key: "token".to_string(),
            });
        }
        if self.cloud.host.trim().is_empty() {
            return Err(ConfigurationError::Missing {
                key: "host".to_string(),
            });
        }
        if !matches!(self.cloud.scheme.as_str(), "http" | "https") {
            return Err(ConfigurationError::Invalid {
                message: format!("unsupported scheme '{}'", self.cloud.scheme),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigurationError::Invalid {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Load configuration from an optional JSON file and `IRON_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        Self::load_from(path, None)
    }

    /// Same as [`load`](Self::load) with an explicit environment map in
    /// place of the process environment.
    ///
    /// Keys use the same `IRON_*` names as the process environment. `None`
    /// reads the process environment.
    pub fn load_from(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigurationError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(
                config::File::from(path)
                    .required(true)
                    .format(config::FileFormat::Json),
            );
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(env))
            .build()
            .map_err(|e| ConfigurationError::Parsing {
                message: e.to_string(),
            })?;

        let raw: RawConfig = settings
            .try_deserialize()
            .map_err(|e| ConfigurationError::Parsing {
                message: e.to_string(),
            })?;

        let config = raw.into_config()?;
        config.validate()?;
        Ok(config)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("project_id", &self.project_id)
            .field("token", &"[REDACTED]")
            .field("cloud", &self.cloud)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Flat key layout shared by the file and environment sources
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    project_id: Option<String>,
    token: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    scheme: Option<String>,
    api_version: Option<u32>,
    timeout_secs: Option<u64>,
}

impl RawConfig {
    fn into_config(self) -> Result<ClientConfig, ConfigurationError> {
        let project_id = self.project_id.ok_or_else(|| ConfigurationError::Missing {
            key: "project_id".to_string(),
        })?;
        let token = self.token.ok_or_else(|| ConfigurationError::Missing {
            key: "token".to_string(),
        })?;

        let default_cloud = Cloud::default();
        let cloud = Cloud {
            scheme: self.scheme.unwrap_or(default_cloud.scheme),
            host: self.host.unwrap_or(default_cloud.host),
            port: self.port.unwrap_or(default_cloud.port),
        };

        let mut config = ClientConfig::new(project_id, token).with_cloud(cloud);
        if let Some(api_version) = self.api_version {
            config.api_version = api_version;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(timeout_secs);
        }
        Ok(config)
    }
}
