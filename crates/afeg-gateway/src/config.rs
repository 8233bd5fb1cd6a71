//! Configuration for the AFEG gateway daemon.

use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::net::SocketAddr;

/// Main daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub surge: SurgeConfig,

    #[serde(default)]
    pub treasury: TreasuryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: SocketAddr,

    /// Enable permissive CORS.
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
        }
    }
}

/// Surge run defaults applied when a request omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurgeConfig {
    #[serde(default = "default_surge_iterations")]
    pub iterations: u32,

    #[serde(default = "default_surge_scale")]
    pub scale_factor: f64,

    /// Pause between iterations in milliseconds. Zero disables pacing, which
    /// is how tests and batch synthesis run.
    #[serde(default)]
    pub pace_ms: u64,

    /// Hard cap on requested iterations, since the run executes inline.
    #[serde(default = "default_surge_max_iterations")]
    pub max_iterations: u32,
}

impl Default for SurgeConfig {
    fn default() -> Self {
        Self {
            iterations: default_surge_iterations(),
            scale_factor: default_surge_scale(),
            pace_ms: 0,
            max_iterations: default_surge_max_iterations(),
        }
    }
}

/// Treasury view access control.
///
/// Only a SHA-256 digest of the access key is ever held; the request path
/// digests the presented key and compares digests.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TreasuryConfig {
    /// Hex SHA-256 digest of the access key. When unset the treasury view is
    /// disabled entirely.
    #[serde(default)]
    pub access_key_digest: Option<String>,
}

impl TreasuryConfig {
    /// Set the digest from a plaintext key (startup only).
    pub fn set_key(&mut self, key: &str) {
        self.access_key_digest = Some(digest_key(key));
    }

    /// Check a presented key against the configured digest.
    pub fn key_matches(&self, presented: &str) -> bool {
        match &self.access_key_digest {
            Some(expected) => digest_key(presented) == *expected,
            None => false,
        }
    }
}

/// Hex SHA-256 of an access key.
pub fn digest_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    // Loopback only by default; the gateway carries no auth on the billing
    // endpoints.
    "127.0.0.1:8460"
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8460)))
}

fn default_surge_iterations() -> u32 {
    30
}

fn default_surge_scale() -> f64 {
    100.0
}

fn default_surge_max_iterations() -> u32 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GatewayConfig {
    /// Load configuration: defaults, then an optional file, then `AFEG_`
    /// prefixed environment variables.
    pub fn load(path: Option<&str>) -> GatewayResult<Self> {
        let mut builder = config::Config::builder();

        builder = builder
            .add_source(config::Config::try_from(&GatewayConfig::default()).map_err(wrap)?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("AFEG")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .map_err(wrap)?
            .try_deserialize()
            .map_err(wrap)
    }
}

fn wrap(err: config::ConfigError) -> GatewayError {
    GatewayError::Config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_loopback_and_unpaced() {
        let config = GatewayConfig::default();
        assert!(config.server.listen_addr.ip().is_loopback());
        assert_eq!(config.surge.iterations, 30);
        assert_eq!(config.surge.pace_ms, 0);
        assert!(config.treasury.access_key_digest.is_none());
    }

    #[test]
    fn load_wraps_failures_as_config_errors() {
        let config = GatewayConfig::load(None).expect("load defaults");
        assert_eq!(config.surge.iterations, 30);

        let err = wrap(config::ConfigError::Message("bad value".to_string()));
        assert!(matches!(err, GatewayError::Config(_)));
        assert!(err.to_string().contains("configuration error"));
    }

    #[test]
    fn treasury_digest_round_trip() {
        let mut treasury = TreasuryConfig::default();
        assert!(!treasury.key_matches("anything"));

        treasury.set_key("athena-fabric-v4");
        assert!(treasury.key_matches("athena-fabric-v4"));
        assert!(!treasury.key_matches("athena-fabric-v5"));

        // Only the digest is held.
        let digest = treasury.access_key_digest.as_deref().unwrap();
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, "athena-fabric-v4");
    }
}
