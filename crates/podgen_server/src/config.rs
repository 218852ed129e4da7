//! Configuration for the local job runner

use derive_getters::Getters;
use podgen_error::ConfigError;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Listening address of the job runner
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ServerConfig {
    /// Interface to bind
    #[builder(default = "DEFAULT_HOST.to_string()")]
    host: String,
    /// Port to bind
    #[builder(default = "DEFAULT_PORT")]
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables
    ///
    /// Reads:
    /// - `PODGEN_HOST` (default: "0.0.0.0")
    /// - `PODGEN_PORT` (default: 8080)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("PODGEN_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        host.parse::<IpAddr>()
            .map_err(|_| ConfigError::invalid_var("PODGEN_HOST", &host, "an IP address"))?;

        let port = match lookup("PODGEN_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::invalid_var("PODGEN_PORT", &raw, "a port number"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self { host, port })
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = self
            .host
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::invalid_var("PODGEN_HOST", &self.host, "an IP address"))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
