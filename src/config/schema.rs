//! Configuration schema definitions.
//!
//! Two shapes live here: [`ConfigFile`] mirrors what a config file may
//! contain (every key optional), and [`WebhookConfig`] is the resolved,
//! validated configuration the rest of the process consumes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: &str = "8080";
pub const DEFAULT_ENDPOINT_NAME: &str = "default";
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook";
pub const DEFAULT_MAX_BODY_BYTES: u64 = 1 << 20;

/// Resolved receiver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Port to bind on all interfaces.
    pub port: String,

    /// Path of the single default endpoint (simple mode).
    pub webhook_path: String,

    /// Endpoints to register, in configured order.
    pub endpoints: Vec<EndpointConfig>,

    /// Log every request header of accepted webhooks.
    pub log_headers: bool,

    /// Log the raw body of accepted webhooks.
    pub log_body: bool,

    /// Per-request body cap in bytes. Always positive once resolved.
    pub max_body_bytes: u64,

    /// Serve HTTPS instead of plain HTTP.
    pub https_enabled: bool,

    /// PEM certificate chain.
    pub tls_cert_file: Option<PathBuf>,

    /// PEM private key.
    pub tls_key_file: Option<PathBuf>,

    /// Prometheus scrape listener, e.g. `0.0.0.0:9090`.
    pub metrics_address: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
            endpoints: vec![EndpointConfig::default_at(DEFAULT_WEBHOOK_PATH)],
            log_headers: true,
            log_body: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            https_enabled: false,
            tls_cert_file: None,
            tls_key_file: None,
            metrics_address: None,
        }
    }
}

/// One webhook endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Label used in logs and responses. Defaults to the path.
    pub name: String,

    /// Route path, must start with `/`.
    pub path: String,

    /// Literal IPs or CIDR blocks allowed to call this endpoint.
    /// Empty allows everyone.
    pub allowed_sources: Vec<String>,
}

impl EndpointConfig {
    /// The unrestricted endpoint named `default` at `path`.
    pub fn default_at(path: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_ENDPOINT_NAME.to_string(),
            path: path.into(),
            allowed_sources: Vec::new(),
        }
    }
}

/// Raw contents of a config file.
///
/// Absent keys stay `None` so the loader can tell "not set" apart from a
/// zero value.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigFile {
    pub port: Option<PortValue>,
    pub webhook_path: Option<String>,
    pub endpoints: Option<Vec<EndpointConfig>>,
    pub log_headers: Option<bool>,
    pub log_body: Option<bool>,
    pub max_body_bytes: Option<i64>,
    pub https_enabled: Option<bool>,
    pub tls_cert_file: Option<String>,
    pub tls_key_file: Option<String>,
    pub metrics_address: Option<String>,
}

/// A port written either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for PortValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortValue::Number(n) => write!(f, "{}", n),
            PortValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&WebhookConfig> for ConfigFile {
    fn from(config: &WebhookConfig) -> Self {
        Self {
            port: Some(PortValue::Text(config.port.clone())),
            webhook_path: Some(config.webhook_path.clone()),
            endpoints: Some(config.endpoints.clone()),
            log_headers: Some(config.log_headers),
            log_body: Some(config.log_body),
            max_body_bytes: i64::try_from(config.max_body_bytes).ok(),
            https_enabled: Some(config.https_enabled),
            tls_cert_file: config
                .tls_cert_file
                .as_ref()
                .map(|p| p.display().to_string()),
            tls_key_file: config
                .tls_key_file
                .as_ref()
                .map(|p| p.display().to_string()),
            metrics_address: config.metrics_address.clone(),
        }
    }
}
