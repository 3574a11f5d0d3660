use std::time::Duration;

use ureq::{tls::TlsConfig, Agent};

/// Connection and timeout settings applied to every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportOptions {
    pub user_agent: Option<String>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Longest a POST may spend receiving its response body.
    pub low_speed_time: Duration,
    pub verify_tls: bool,
}

impl Default for TransportOptions {
    /// Creates the settings the API client has always used.
    ///
    /// Connect timeout 20s, total timeout 240s, POST body window 2400s and
    /// no TLS certificate verification.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use ahrefs_http::TransportOptions;
    ///
    /// let opts = TransportOptions::default();
    /// assert_eq!(opts.connect_timeout, Duration::from_secs(20));
    /// assert_eq!(opts.timeout, Duration::from_secs(240));
    /// assert!(!opts.verify_tls);
    /// ```
    fn default() -> Self {
        Self {
            user_agent: Some(concat!("ahrefs-api-rs/", env!("CARGO_PKG_VERSION")).into()),
            connect_timeout: Duration::from_secs(20),
            timeout: Duration::from_secs(240),
            low_speed_time: Duration::from_secs(2400),
            verify_tls: false,
        }
    }
}

impl TransportOptions {
    /// Builds an HTTP `Agent` configured from these options.
    ///
    /// Non-2xx responses are not turned into errors; the API reports its own
    /// failures in the response body, which callers receive untouched.
    /// gzip decoding is handled by the agent.
    ///
    /// # Examples
    ///
    /// ```
    /// use ahrefs_http::TransportOptions;
    ///
    /// let agent = TransportOptions::default().build();
    /// let _req = agent.get("http://example.com");
    /// ```
    pub fn build(&self) -> Agent {
        let tls = TlsConfig::builder()
            .disable_verification(!self.verify_tls)
            .build();

        let mut config = Agent::config_builder()
            .timeout_connect(Some(self.connect_timeout))
            .timeout_global(Some(self.timeout))
            .http_status_as_error(false)
            .tls_config(tls);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_options_default() {
        let opts = TransportOptions::default();
        assert!(opts
            .user_agent
            .as_deref()
            .is_some_and(|ua| ua.starts_with("ahrefs-api-rs/")));
        assert_eq!(opts.connect_timeout, Duration::from_secs(20));
        assert_eq!(opts.timeout, Duration::from_secs(240));
        assert_eq!(opts.low_speed_time, Duration::from_secs(2400));
        assert!(!opts.verify_tls);
    }

    #[test]
    fn test_transport_options_build() {
        let agent = TransportOptions::default().build();
        let _ = agent.get("https://example.com");
    }

    #[test]
    fn test_transport_options_build_without_user_agent() {
        let opts = TransportOptions {
            user_agent: None,
            verify_tls: true,
            ..Default::default()
        };
        let agent = opts.build();
        let _ = agent.post("https://example.com");
    }
}
