//! Provisioning errors.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while loading the CSR configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors that end a provisioning run.
///
/// Every variant is fatal; nothing is retried and no artifact is left behind.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to generate key material: {0}")]
    KeyGeneration(String),

    #[error("orchestrator request failed: {0}")]
    Orchestrator(#[from] kube::Error),

    #[error("certificate signing request '{name}' was denied: {reason}")]
    Denied { name: String, reason: String },

    #[error("certificate signing request '{name}' failed: {reason}")]
    Failed { name: String, reason: String },

    #[error("certificate signing request '{name}' not issued within {waited:?}")]
    Timeout { name: String, waited: Duration },

    #[error("issued certificate is invalid: {0}")]
    InvalidCertificate(String),

    #[error("cluster CA certificate is not available")]
    MissingClusterCa,

    #[error("failed to write '{path}': {source}")]
    Store {
        path: PathBuf,
        source: std::io::Error,
    },
}
