//! Configuration for the tickstore client
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::protocol::DEFAULT_READ_CHUNK;

/// Default host the server listens on
pub const DEFAULT_HOST: &str = "localhost";

/// Default port the server listens on
pub const DEFAULT_PORT: u16 = 9001;

/// Main configuration for a client instance
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server host name or address
    pub host: String,

    /// Server TCP port
    pub port: u16,

    /// Optional TCP connect timeout
    pub connect_timeout: Option<Duration>,

    /// Optional TCP read timeout
    pub read_timeout: Option<Duration>,

    /// Optional TCP write timeout
    pub write_timeout: Option<Duration>,

    // -------------------------------------------------------------------------
    // Framing Configuration
    // -------------------------------------------------------------------------
    /// Upper bound on bytes requested per read while draining a response
    /// body. Bounds per-call latency; the body reader loops until the full
    /// length has accumulated regardless.
    pub read_chunk_size: usize,

    // -------------------------------------------------------------------------
    // Subscription Configuration
    // -------------------------------------------------------------------------
    /// Delay between two polls when the previous poll returned no data
    pub poll_backoff: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
            read_chunk_size: DEFAULT_READ_CHUNK,
            poll_backoff: Duration::from_millis(10),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// "host:port" form used for connecting
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the TCP connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set the TCP read timeout
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    /// Set the TCP write timeout
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = Some(timeout);
        self
    }

    /// Set the per-read chunk ceiling for body draining
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size.max(1);
        self
    }

    /// Set the delay between empty polls on a subscription
    pub fn poll_backoff(mut self, backoff: Duration) -> Self {
        self.config.poll_backoff = backoff;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
