//! Credential authority configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::registry::DEFAULT_LOOKUP_TIMEOUT;

/// Credential authority configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address for the credential endpoint.
    pub http_bind_addr: String,

    /// CA certificate (PEM, optionally followed by its issuers).
    pub ca_cert_path: PathBuf,

    /// CA private key (PEM).
    pub ca_key_path: PathBuf,

    /// Validity of issued application certificates (days).
    pub cert_validity_days: u32,

    /// Application registry gRPC endpoint.
    pub lookup_endpoint: String,

    /// Deadline of a single registry lookup.
    pub lookup_timeout: Duration,

    /// Node credential directory used to reach the registry over mTLS.
    pub lookup_tls_dir: Option<PathBuf>,

    /// TLS server name of the registry when mTLS is used.
    pub lookup_tls_domain: Option<String>,

    /// Reject CSRs whose Common Name differs from the peer's application id.
    pub require_cn_match: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_bind_addr: "0.0.0.0:8080".to_string(),
            ca_cert_path: PathBuf::from("certs/ca.crt"),
            ca_key_path: PathBuf::from("certs/ca.key"),
            cert_validity_days: 7,
            lookup_endpoint: "http://127.0.0.1:42101".to_string(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            lookup_tls_dir: None,
            lookup_tls_domain: None,
            require_cn_match: false,
        }
    }
}
