use std::{fs, path::Path, time::Duration};

use ahrefs_http::TransportOptions;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApiError, Result};

pub const DEFAULT_API_URL: &str = "http://apiv2.ahrefs.com";

/// Connection settings for the HTTP transport.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Seconds allowed to establish a connection.
    /// Default: 20
    pub connect_timeout: u64,

    /// Seconds allowed for a whole request.
    /// Default: 240
    pub timeout: u64,

    /// Seconds a POST may spend receiving its response.
    /// Default: 2400
    pub low_speed_time: u64,

    /// Verify the server's TLS certificate.
    /// Default: false
    pub verify_tls: bool,

    /// Overrides the default User-Agent header.
    pub user_agent: Option<String>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        let options = TransportOptions::default();
        Self {
            connect_timeout: options.connect_timeout.as_secs(),
            timeout: options.timeout.as_secs(),
            low_speed_time: options.low_speed_time.as_secs(),
            verify_tls: options.verify_tls,
            user_agent: None,
        }
    }
}

impl From<&TransportSettings> for TransportOptions {
    fn from(settings: &TransportSettings) -> Self {
        let defaults = TransportOptions::default();
        Self {
            user_agent: settings.user_agent.clone().or(defaults.user_agent),
            connect_timeout: Duration::from_secs(settings.connect_timeout),
            timeout: Duration::from_secs(settings.timeout),
            low_speed_time: Duration::from_secs(settings.low_speed_time),
            verify_tls: settings.verify_tls,
        }
    }
}

/// Client configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API access token. Required.
    pub token: String,

    /// Log the URL and timing of every request at info level.
    /// Default: false
    pub debug: bool,

    /// Base URL of the API.
    /// Default: http://apiv2.ahrefs.com
    pub api_url: String,

    /// Validate queries against the schema before sending them.
    /// Default: true
    pub checking: bool,

    /// Schema file to use instead of the bundled one.
    pub schema_path: Option<String>,

    pub transport: TransportSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            debug: false,
            api_url: DEFAULT_API_URL.to_string(),
            checking: true,
            schema_path: None,
            transport: TransportSettings::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| {
            ApiError::ConfigIo {
                path: path.display().to_string(),
                source,
            }
        })?;
        debug!(path = %path.display(), "loaded client config");
        Self::from_toml_str(&content)
    }

    /// Loads the file named by `AHREFS_CONFIG` (defaults otherwise), then
    /// applies `AHREFS_TOKEN` and `AHREFS_API_URL` on top.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("AHREFS_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(token) = std::env::var("AHREFS_TOKEN") {
            config.token = token;
        }
        if let Ok(api_url) = std::env::var("AHREFS_API_URL") {
            info!("using API URL from environment: {}", api_url);
            config.api_url = api_url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(ApiError::MissingToken);
        }
        Ok(())
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions::from(&self.transport)
    }
}
