//! Environment variable access.

use std::collections::HashMap;

pub const CONFIG_PATH: &str = "CONFIG_PATH";
pub const PORT: &str = "PORT";
pub const WEBHOOK_PATH: &str = "WEBHOOK_PATH";
pub const HTTPS_ENABLED: &str = "HTTPS_ENABLED";
pub const TLS_CERT_FILE: &str = "TLS_CERT_FILE";
pub const TLS_KEY_FILE: &str = "TLS_KEY_FILE";
pub const METRICS_ADDRESS: &str = "METRICS_ADDRESS";

/// Source of environment variables.
///
/// The loader reads through this trait so tests can supply a fixed map
/// instead of mutating the process environment.
pub trait Environment {
    /// Value of `key`, or `None` when unset or empty.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

impl Environment for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }
}

/// Parse `1`, `t`, `T`, `TRUE`, `true`, `True` and their false counterparts.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
