//! Configuration loading from disk and environment.
//!
//! # Precedence
//! ```text
//! hard-coded defaults
//!     → config file (field by field, when present)
//!     → defaults again for zero values (port, body cap, webhook path)
//!     → endpoint normalization
//!     → HTTPS auto-enable from the file's cert and key
//!     → environment overrides
//!     → validation
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::env::{self, parse_bool, Environment, ProcessEnv};
use crate::config::schema::{
    ConfigFile, EndpointConfig, WebhookConfig, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT,
    DEFAULT_WEBHOOK_PATH,
};
use crate::config::validation::{validate_config, ValidationError};

/// Used when neither `CONFIG_PATH` nor any candidate file exists.
pub const DEFAULT_CONFIG_PATH: &str = "configs/config.yml";

/// Probed in order when `CONFIG_PATH` is unset.
pub const CANDIDATE_CONFIG_PATHS: &[&str] = &[
    "configs/config.yml",
    "configs/config.yaml",
    "configs/config.json",
    "config.yml",
    "config.yaml",
    "config.json",
    "configs/config.toml",
    "config.toml",
];

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("invalid {var} value {value:?}: expected a boolean")]
    EnvOverride { var: &'static str, value: String },

    #[error("{}", describe_validation(.0))]
    Validation(Vec<ValidationError>),
}

fn describe_validation(errors: &[ValidationError]) -> String {
    let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!("validation failed: {}", details.join("; "))
}

/// Syntax error from one of the supported file formats.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Config file syntax, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.json` and `.toml` select those formats; everything else is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }

    /// Parse file contents. An empty (or whitespace-only) file is an empty document.
    pub fn parse(self, content: &str) -> Result<ConfigFile, ParseError> {
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        let file = match self {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        Ok(file)
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: WebhookConfig,
    /// The path that was read, or would have been read.
    pub path: PathBuf,
    /// False when the file did not exist and defaults were used.
    pub file_found: bool,
}

/// Resolves, reads and validates the receiver configuration.
#[derive(Debug, Clone)]
pub struct ConfigLoader<E = ProcessEnv> {
    environment: E,
    base_dir: Option<PathBuf>,
    explicit_path: Option<PathBuf>,
}

impl ConfigLoader<ProcessEnv> {
    /// Loader reading the process environment, relative to the working directory.
    pub fn from_process_env() -> Self {
        Self::new(ProcessEnv)
    }
}

impl<E: Environment> ConfigLoader<E> {
    pub fn new(environment: E) -> Self {
        Self {
            environment,
            base_dir: None,
            explicit_path: None,
        }
    }

    /// Resolve relative config paths against `dir` instead of the working directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Use `path` regardless of `CONFIG_PATH` and the candidate list.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// The file this loader reads.
    ///
    /// Explicit path, then `CONFIG_PATH`, then the first existing candidate,
    /// then [`DEFAULT_CONFIG_PATH`] even if it does not exist.
    pub fn config_path(&self) -> PathBuf {
        if let Some(path) = &self.explicit_path {
            return self.locate(path);
        }
        if let Some(path) = self.environment.var(env::CONFIG_PATH) {
            return self.locate(Path::new(&path));
        }
        CANDIDATE_CONFIG_PATHS
            .iter()
            .map(|candidate| self.locate(Path::new(candidate)))
            .find(|path| path.exists())
            .unwrap_or_else(|| self.locate(Path::new(DEFAULT_CONFIG_PATH)))
    }

    fn locate(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Load and validate the configuration.
    ///
    /// A missing file is not an error: defaults and environment overrides
    /// apply and `file_found` is false.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let path = self.config_path();
        tracing::debug!(path = %path.display(), "Resolved config path");

        let (file, file_found) = match fs::read_to_string(&path) {
            Ok(content) => {
                let file = ConfigFormat::from_path(&path)
                    .parse(&content)
                    .map_err(|source| ConfigError::Parse {
                        path: path.clone(),
                        source,
                    })?;
                (file, true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => (ConfigFile::default(), false),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let config = resolve_config(file, &self.environment)?;
        Ok(LoadedConfig {
            config,
            path,
            file_found,
        })
    }
}

/// Merge file contents over defaults, apply environment overrides and validate.
pub fn resolve_config(
    file: ConfigFile,
    environment: &impl Environment,
) -> Result<WebhookConfig, ConfigError> {
    let mut config = merge_file(file);
    apply_env_overrides(&mut config, environment)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn merge_file(file: ConfigFile) -> WebhookConfig {
    let mut config = WebhookConfig::default();

    if let Some(port) = file.port {
        config.port = port.to_string();
    }
    if let Some(path) = file.webhook_path {
        config.webhook_path = path;
    }
    if let Some(endpoints) = file.endpoints {
        config.endpoints = endpoints;
    }
    if let Some(log_headers) = file.log_headers {
        config.log_headers = log_headers;
    }
    if let Some(log_body) = file.log_body {
        config.log_body = log_body;
    }
    if let Some(max_body_bytes) = file.max_body_bytes {
        config.max_body_bytes = u64::try_from(max_body_bytes).unwrap_or(0);
    }
    config.tls_cert_file = non_empty(file.tls_cert_file).map(PathBuf::from);
    config.tls_key_file = non_empty(file.tls_key_file).map(PathBuf::from);
    config.metrics_address = non_empty(file.metrics_address);

    if config.port.is_empty() {
        config.port = DEFAULT_PORT.to_string();
    }
    if config.max_body_bytes == 0 {
        config.max_body_bytes = DEFAULT_MAX_BODY_BYTES;
    }
    config.endpoints = normalize_endpoints(
        std::mem::take(&mut config.endpoints),
        Some(config.webhook_path.as_str()),
    );
    if config.webhook_path.is_empty() {
        if let Some(first) = config.endpoints.first() {
            config.webhook_path = first.path.clone();
        }
    }

    // Only the file's cert and key count here; env-supplied files need
    // HTTPS_ENABLED to turn HTTPS on.
    config.https_enabled = file
        .https_enabled
        .unwrap_or(config.tls_cert_file.is_some() && config.tls_key_file.is_some());

    config
}

/// Drop path-less endpoints, default names to paths, and guarantee at least
/// one endpoint.
pub fn normalize_endpoints(
    endpoints: Vec<EndpointConfig>,
    webhook_path: Option<&str>,
) -> Vec<EndpointConfig> {
    let mut normalized: Vec<EndpointConfig> = endpoints
        .into_iter()
        .filter(|endpoint| !endpoint.path.is_empty())
        .map(|mut endpoint| {
            if endpoint.name.is_empty() {
                endpoint.name = endpoint.path.clone();
            }
            endpoint
        })
        .collect();

    if normalized.is_empty() {
        let path = webhook_path
            .filter(|path| !path.is_empty())
            .unwrap_or(DEFAULT_WEBHOOK_PATH);
        normalized.push(EndpointConfig::default_at(path));
    }

    normalized
}

fn apply_env_overrides(
    config: &mut WebhookConfig,
    environment: &impl Environment,
) -> Result<(), ConfigError> {
    if let Some(port) = environment.var(env::PORT) {
        config.port = port;
    }
    if let Some(value) = environment.var(env::HTTPS_ENABLED) {
        let enabled = parse_bool(&value).ok_or(ConfigError::EnvOverride {
            var: env::HTTPS_ENABLED,
            value: value.clone(),
        })?;
        config.https_enabled = enabled;
    }
    if let Some(cert) = environment.var(env::TLS_CERT_FILE) {
        config.tls_cert_file = Some(PathBuf::from(cert));
    }
    if let Some(key) = environment.var(env::TLS_KEY_FILE) {
        config.tls_key_file = Some(PathBuf::from(key));
    }
    if let Some(address) = environment.var(env::METRICS_ADDRESS) {
        config.metrics_address = Some(address);
    }
    // Simple mode: a single unrestricted endpoint replaces the configured list.
    if let Some(path) = environment.var(env::WEBHOOK_PATH) {
        config.endpoints = vec![EndpointConfig::default_at(path.clone())];
        config.webhook_path = path;
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
