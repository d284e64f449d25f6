//! Gateway configuration.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use xrate_fx::ResolverConfig;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

/// Main gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Rate cache TTL in seconds. Zero or less disables the cache.
    pub cache_ttl_seconds: i64,
    /// Bound on each upstream source attempt.
    pub fetch_timeout: Duration,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1".to_string(),
            listen_port: 8080,
            cache_ttl_seconds: 3600,
            fetch_timeout: Duration::from_millis(15_000),
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Unparseable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ttl) = lookup("RATES_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.trim().parse() {
                config.cache_ttl_seconds = ttl;
            }
        }

        if let Some(timeout) = lookup("RATES_FETCH_TIMEOUT_MS") {
            if let Ok(ms) = timeout.trim().parse() {
                config.fetch_timeout = Duration::from_millis(ms);
            }
        }

        if let Some(addr) = lookup("GATEWAY_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(port) = lookup("GATEWAY_LISTEN_PORT") {
            if let Ok(port) = port.trim().parse() {
                config.listen_port = port;
            }
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(format) = lookup("LOG_FORMAT").as_deref().and_then(LogFormat::parse) {
            config.log_format = format;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.listen_addr.parse::<IpAddr>().is_err() {
            return Err(format!("Listen address {:?} is not an IP address", self.listen_addr));
        }

        if self.fetch_timeout.is_zero() {
            return Err("Fetch timeout cannot be 0".to_string());
        }

        Ok(())
    }

    /// Socket address to bind.
    pub fn bind_address(&self) -> Result<SocketAddr, String> {
        let ip: IpAddr = self
            .listen_addr
            .parse()
            .map_err(|e| format!("Invalid listen address {:?}: {}", self.listen_addr, e))?;
        Ok(SocketAddr::new(ip, self.listen_port))
    }

    /// Resolver settings derived from this configuration.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            ttl_seconds: self.cache_ttl_seconds,
            ..ResolverConfig::default()
        }
    }
}
