//! Client configuration.

use crate::error::{ApiError, ApiResult};

/// AppVeyor REST API root.
pub const DEFAULT_BASE_URL: &str = "https://ci.appveyor.com/api";

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("appveyor-client/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "APPVEYOR_TOKEN";

/// Environment variable overriding the API root, e.g. for a self-hosted server.
pub const BASE_URL_ENV_VAR: &str = "APPVEYOR_API_URL";

/// Non-secret client settings. The token is passed separately so it never
/// ends up in a cloned or logged config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Defaults, with `APPVEYOR_API_URL` applied when set.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let mut builder = Self::builder();
        if let Some(url) = lookup(BASE_URL_ENV_VAR).filter(|url| !url.trim().is_empty()) {
            builder = builder.base_url(url);
        }
        builder.build()
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::Config("base URL cannot be empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::Config(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.user_agent.is_empty() {
            return Err(ApiError::Config("User-Agent cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Builds and validates the configuration. A trailing `/` on the base
    /// URL is dropped so paths can always be appended as `/resource`.
    pub fn build(self) -> ApiResult<ClientConfig> {
        let defaults = ClientConfig::default();
        let config = ClientConfig {
            base_url: self
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        };
        config.validate()?;
        Ok(config)
    }
}
