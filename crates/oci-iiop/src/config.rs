// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connector configuration.
//!
//! [`ConnectorConfig`] carries the knobs the embedding ORB sets for outbound
//! IIOP connections. `TCP_NODELAY` is not configurable: it is always enabled
//! on a freshly connected socket.
//!
//! # Example
//!
//! ```
//! use oci_iiop::config::ConnectorConfig;
//! use std::time::Duration;
//!
//! let config = ConnectorConfig::default()
//!     .with_keepalive(true, Some(Duration::from_secs(60)))
//!     .with_connect_timeout(Duration::from_millis(500));
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable enabling SO_KEEPALIVE (`1`/`true`/`yes`).
pub const ENV_KEEPALIVE: &str = "OCI_IIOP_KEEPALIVE";

/// Environment variable setting the keep-alive idle time in milliseconds.
pub const ENV_KEEPALIVE_TIME_MS: &str = "OCI_IIOP_KEEPALIVE_TIME_MS";

/// Environment variable setting the default connect deadline in milliseconds.
pub const ENV_CONNECT_TIMEOUT_MS: &str = "OCI_IIOP_CONNECT_TIMEOUT_MS";

/// Outbound connection configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default))]
pub struct ConnectorConfig {
    /// Enable TCP keep-alive probes on connected sockets
    pub keepalive: bool,

    /// Idle time before the first keep-alive probe (None = OS default)
    #[cfg_attr(feature = "config-loaders", serde(with = "millis_opt"))]
    pub keepalive_time: Option<Duration>,

    /// Default deadline for `Connector::establish()` (None = no deadline)
    #[cfg_attr(feature = "config-loaders", serde(with = "millis_opt"))]
    pub connect_timeout: Option<Duration>,

    /// Listen backlog for sockets built by the default connection helper
    pub listen_backlog: u32,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            keepalive: false,
            keepalive_time: None,
            connect_timeout: None,
            listen_backlog: 128,
        }
    }
}

impl ConnectorConfig {
    /// Builder: set keep-alive and its idle time
    pub fn with_keepalive(mut self, enabled: bool, time: Option<Duration>) -> Self {
        self.keepalive = enabled;
        self.keepalive_time = time;
        self
    }

    /// Builder: set the default connect deadline
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Builder: set the listen backlog
    pub fn with_listen_backlog(mut self, backlog: u32) -> Self {
        self.listen_backlog = backlog;
        self
    }

    /// Defaults overridden by `OCI_IIOP_*` environment variables.
    ///
    /// Unparseable values are reported as [`Error::Config`] rather than
    /// silently ignored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_KEEPALIVE) {
            config.keepalive = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(Error::Config(format!(
                        "{}: expected a boolean, got '{}'",
                        ENV_KEEPALIVE, other
                    )))
                }
            };
        }

        if let Some(raw) = lookup(ENV_KEEPALIVE_TIME_MS) {
            config.keepalive_time = Some(parse_millis(ENV_KEEPALIVE_TIME_MS, &raw)?);
        }

        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT_MS) {
            config.connect_timeout = Some(parse_millis(ENV_CONNECT_TIMEOUT_MS, &raw)?);
        }

        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    /// Parse a YAML document (missing keys take their defaults).
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Validate configuration.
    pub fn validate(&self) -> core::result::Result<(), String> {
        if self.connect_timeout == Some(Duration::ZERO) {
            return Err("connect_timeout must be > 0".into());
        }

        if let Some(time) = self.keepalive_time {
            if !self.keepalive {
                return Err("keepalive_time set but keepalive is disabled".into());
            }
            if time.is_zero() {
                return Err("keepalive_time must be > 0".into());
            }
        }

        if self.listen_backlog == 0 {
            return Err("listen_backlog must be > 0".into());
        }

        Ok(())
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| Error::Config(format!("{}: invalid milliseconds '{}': {}", key, raw, e)))
}

#[cfg(feature = "config-loaders")]
mod millis_opt {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

// ============================================================================
// Tests
// ============================================================================
