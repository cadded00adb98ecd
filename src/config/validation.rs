//! Configuration validation.
//!
//! # Responsibilities
//! - TLS pairing (https needs both files, either file needs the other)
//! - Endpoint paths present, absolute, routable and unique
//! - Allow-list entries parse as an IP or a CIDR block
//! - Port is a valid TCP port
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WebhookConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashMap;

use crate::config::schema::WebhookConfig;
use crate::security::AllowedSource;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("tls_cert_file and tls_key_file are required when https_enabled is true")]
    HttpsWithoutCertificate,

    #[error("tls_cert_file is required when tls_key_file is set")]
    KeyWithoutCert,

    #[error("tls_key_file is required when tls_cert_file is set")]
    CertWithoutKey,

    #[error("at least one webhook endpoint must be configured")]
    NoEndpoints,

    #[error("endpoint path cannot be empty (endpoint {name:?})")]
    EmptyPath { name: String },

    #[error("endpoint path {path:?} must start with '/'")]
    RelativePath { path: String },

    #[error("endpoint path {path:?} uses characters reserved by the router ('{{', '}}', or a segment starting with ':' or '*')")]
    ReservedCharacters { path: String },

    #[error("duplicate endpoint path {path:?} configured for {first:?} and {second:?}")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },

    #[error("invalid allowed_sources IP {entry:?} for endpoint {endpoint:?}")]
    InvalidAllowedSource { endpoint: String, entry: String },

    #[error("invalid port {port:?}")]
    InvalidPort { port: String },
}

/// Check a resolved configuration, collecting every problem found.
pub fn validate_config(config: &WebhookConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_tls(config, &mut errors);

    if config.port.parse::<u16>().is_err() {
        errors.push(ValidationError::InvalidPort {
            port: config.port.clone(),
        });
    }

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    let mut seen_paths: HashMap<&str, &str> = HashMap::new();
    for endpoint in &config.endpoints {
        let path = endpoint.path.as_str();
        if path.is_empty() {
            errors.push(ValidationError::EmptyPath {
                name: endpoint.name.clone(),
            });
        } else if !path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                path: path.to_string(),
            });
        } else if has_reserved_characters(path) {
            errors.push(ValidationError::ReservedCharacters {
                path: path.to_string(),
            });
        } else if let Some(existing) = seen_paths.get(path) {
            errors.push(ValidationError::DuplicatePath {
                path: path.to_string(),
                first: existing.to_string(),
                second: endpoint.name.clone(),
            });
        } else {
            seen_paths.insert(path, endpoint.name.as_str());
        }

        for source in &endpoint.allowed_sources {
            if source.parse::<AllowedSource>().is_err() {
                errors.push(ValidationError::InvalidAllowedSource {
                    endpoint: endpoint.name.clone(),
                    entry: source.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn has_reserved_characters(path: &str) -> bool {
    path.contains(['{', '}'])
        || path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
}

fn validate_tls(config: &WebhookConfig, errors: &mut Vec<ValidationError>) {
    let cert = config.tls_cert_file.is_some();
    let key = config.tls_key_file.is_some();

    if config.https_enabled && !(cert && key) {
        errors.push(ValidationError::HttpsWithoutCertificate);
    }
    if !cert && key {
        errors.push(ValidationError::KeyWithoutCert);
    }
    if cert && !key {
        errors.push(ValidationError::CertWithoutKey);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::EndpointConfig;

    fn endpoint(name: &str, path: &str, sources: &[&str]) -> EndpointConfig {
        EndpointConfig {
            name: name.to_string(),
            path: path.to_string(),
            allowed_sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn config_with(endpoints: Vec<EndpointConfig>) -> WebhookConfig {
        WebhookConfig {
            endpoints,
            ..WebhookConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&WebhookConfig::default()), Ok(()));
    }

    #[test]
    fn test_valid_allowed_sources() {
        let config = config_with(vec![endpoint(
            "primary",
            "/webhook/primary",
            &["192.168.1.10", "10.0.0.0/24", "2001:db8::/32"],
        )]);
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_invalid_allowed_source() {
        let config = config_with(vec![endpoint("primary", "/webhook/primary", &["not-an-ip"])]);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidAllowedSource {
                endpoint: "primary".into(),
                entry: "not-an-ip".into(),
            }]
        );
        assert!(errors[0].to_string().contains("invalid allowed_sources IP"));
    }

    #[test]
    fn test_https_requires_both_files() {
        let config = WebhookConfig {
            https_enabled: true,
            ..WebhookConfig::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::HttpsWithoutCertificate]);
    }

    #[test]
    fn test_tls_files_must_be_paired() {
        let cert_only = WebhookConfig {
            tls_cert_file: Some("cert.pem".into()),
            ..WebhookConfig::default()
        };
        assert_eq!(
            validate_config(&cert_only).unwrap_err(),
            vec![ValidationError::CertWithoutKey]
        );

        let key_only = WebhookConfig {
            tls_key_file: Some("key.pem".into()),
            ..WebhookConfig::default()
        };
        assert_eq!(
            validate_config(&key_only).unwrap_err(),
            vec![ValidationError::KeyWithoutCert]
        );
    }

    #[test]
    fn test_https_with_both_files() {
        let config = WebhookConfig {
            https_enabled: true,
            tls_cert_file: Some("cert.pem".into()),
            tls_key_file: Some("key.pem".into()),
            ..WebhookConfig::default()
        };
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_no_endpoints() {
        let errors = validate_config(&config_with(Vec::new())).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoEndpoints]);
    }

    #[test]
    fn test_bad_paths() {
        let config = config_with(vec![
            endpoint("empty", "", &[]),
            endpoint("relative", "hooks", &[]),
            endpoint("capture", "/hooks/{id}", &[]),
            endpoint("legacy", "/hooks/:id", &[]),
        ]);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyPath {
                    name: "empty".into()
                },
                ValidationError::RelativePath {
                    path: "hooks".into()
                },
                ValidationError::ReservedCharacters {
                    path: "/hooks/{id}".into()
                },
                ValidationError::ReservedCharacters {
                    path: "/hooks/:id".into()
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_paths_name_both_endpoints() {
        let config = config_with(vec![
            endpoint("zabbix", "/alerts", &[]),
            endpoint("grafana", "/alerts", &[]),
        ]);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        let message = errors[0].to_string();
        assert!(message.contains("\"/alerts\""), "{message}");
        assert!(message.contains("\"zabbix\""), "{message}");
        assert!(message.contains("\"grafana\""), "{message}");
    }

    #[test]
    fn test_invalid_port() {
        let config = WebhookConfig {
            port: "http".into(),
            ..WebhookConfig::default()
        };
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidPort {
                port: "http".into()
            }]
        );
    }

    #[test]
    fn test_collects_every_error() {
        let config = WebhookConfig {
            https_enabled: true,
            port: "99999".into(),
            endpoints: vec![endpoint("a", "/a", &["nope"]), endpoint("b", "/a", &[])],
            ..WebhookConfig::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
