//! HTTPS listener material.
//!
//! The receiver serves HTTPS only when `https_enabled` resolved to true and
//! both PEM files are configured. The files are checked and parsed when the
//! server starts, not when config is loaded.

use std::path::PathBuf;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::WebhookConfig;

/// Error type for TLS setup.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("certificate file not found: {}", .0.display())]
    MissingCertificate(PathBuf),

    #[error("private key file not found: {}", .0.display())]
    MissingKey(PathBuf),

    #[error("failed to load certificate {} and key {}: {source}", .cert.display(), .key.display())]
    Load {
        cert: PathBuf,
        key: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// PEM certificate chain and private key for the HTTPS listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsFiles {
    /// The files to serve with, or `None` for plain HTTP.
    pub fn from_config(config: &WebhookConfig) -> Option<Self> {
        if !config.https_enabled {
            return None;
        }
        match (&config.tls_cert_file, &config.tls_key_file) {
            (Some(cert), Some(key)) => Some(Self {
                cert: cert.clone(),
                key: key.clone(),
            }),
            _ => None,
        }
    }

    /// Read both files into a rustls server config.
    pub async fn load(&self) -> Result<RustlsConfig, TlsError> {
        if !self.cert.exists() {
            return Err(TlsError::MissingCertificate(self.cert.clone()));
        }
        if !self.key.exists() {
            return Err(TlsError::MissingKey(self.key.clone()));
        }

        RustlsConfig::from_pem_file(&self.cert, &self.key)
            .await
            .map_err(|source| TlsError::Load {
                cert: self.cert.clone(),
                key: self.key.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn https_config(cert: Option<&str>, key: Option<&str>, enabled: bool) -> WebhookConfig {
        WebhookConfig {
            https_enabled: enabled,
            tls_cert_file: cert.map(PathBuf::from),
            tls_key_file: key.map(PathBuf::from),
            ..WebhookConfig::default()
        }
    }

    #[test]
    fn test_from_config() {
        assert_eq!(
            TlsFiles::from_config(&https_config(Some("c.pem"), Some("k.pem"), true)),
            Some(TlsFiles {
                cert: "c.pem".into(),
                key: "k.pem".into(),
            })
        );
        assert_eq!(
            TlsFiles::from_config(&https_config(Some("c.pem"), Some("k.pem"), false)),
            None
        );
        assert_eq!(TlsFiles::from_config(&https_config(None, None, true)), None);
    }

    #[tokio::test]
    async fn test_missing_certificate() {
        let dir = tempfile::tempdir().unwrap();
        let files = TlsFiles {
            cert: dir.path().join("cert.pem"),
            key: dir.path().join("key.pem"),
        };
        let err = files.load().await.unwrap_err();
        assert!(matches!(err, TlsError::MissingCertificate(ref path) if *path == files.cert));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let files = TlsFiles {
            cert: dir.path().join("cert.pem"),
            key: dir.path().join("key.pem"),
        };
        std::fs::write(&files.cert, "not a real certificate").unwrap();

        let err = files.load().await.unwrap_err();
        assert!(matches!(err, TlsError::MissingKey(_)));
        assert!(err.to_string().contains("private key file not found"));
    }

    #[tokio::test]
    async fn test_unparsable_pem() {
        let dir = tempfile::tempdir().unwrap();
        let files = TlsFiles {
            cert: dir.path().join("cert.pem"),
            key: dir.path().join("key.pem"),
        };
        std::fs::write(&files.cert, "not a real certificate").unwrap();
        std::fs::write(&files.key, "not a real key").unwrap();

        let err = files.load().await.unwrap_err();
        assert!(matches!(err, TlsError::Load { .. }));
    }
}
