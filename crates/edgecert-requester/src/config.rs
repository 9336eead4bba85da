//! Bootstrap requester configuration.
//!
//! The requester is driven by a JSON file describing the CSR to submit:
//!
//! ```json
//! {
//!   "csr": {
//!     "name": "edgenode-1",
//!     "subject": { "commonName": "system:node:edgenode-1", "organization": ["system:nodes"] },
//!     "dnsSans": ["edgenode-1.local"],
//!     "ipSans": ["10.0.0.1"],
//!     "keyUsages": ["digital signature", "key encipherment", "server auth", "client auth"]
//!   },
//!   "signer": "kubernetes.io/kubelet-serving",
//!   "waitTimeSecs": 300
//! }
//! ```

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default time to wait for the certificate to be issued.
pub const DEFAULT_WAIT_TIME_SECS: u64 = 300;

/// Default directory receiving the provisioned artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "/etc/edgecert/certs";

/// Shortest validity the orchestrator accepts for a requested duration.
pub const MIN_EXPIRATION_SECONDS: i32 = 600;

/// Key usages requested when the config lists none.
pub const DEFAULT_KEY_USAGES: [&str; 4] = [
    "digital signature",
    "key encipherment",
    "server auth",
    "client auth",
];

/// Requester configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequesterConfig {
    /// CSR to generate and submit.
    pub csr: CsrConfig,

    /// Signer that should sign the request.
    pub signer: String,

    /// Upper bound on the wait for issuance (seconds).
    #[serde(default = "default_wait_time_secs")]
    pub wait_time_secs: u64,

    /// Requested certificate lifetime (seconds).
    #[serde(default)]
    pub expiration_seconds: Option<i32>,

    /// Directory receiving the artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// The CertificateSigningRequest object to create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrConfig {
    /// Name of the CertificateSigningRequest object.
    pub name: String,

    pub subject: SubjectConfig,

    #[serde(default)]
    pub dns_sans: Vec<String>,

    #[serde(default)]
    pub ip_sans: Vec<IpAddr>,

    #[serde(default)]
    pub key_usages: Vec<String>,
}

/// Subject of the requested certificate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectConfig {
    pub common_name: String,

    #[serde(default)]
    pub organization: Vec<String>,
}

fn default_wait_time_secs() -> u64 {
    DEFAULT_WAIT_TIME_SECS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl RequesterConfig {
    /// Read and validate the configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields the orchestrator would otherwise reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.csr.name.trim().is_empty() {
            return Err(ConfigError::Invalid("csr.name is required".to_string()));
        }
        if self.csr.subject.common_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "csr.subject.commonName is required".to_string(),
            ));
        }
        // One value per attribute type in the generated subject.
        if self.csr.subject.organization.len() > 1 {
            return Err(ConfigError::Invalid(
                "csr.subject.organization accepts at most one entry".to_string(),
            ));
        }
        if self.signer.trim().is_empty() {
            return Err(ConfigError::Invalid("signer is required".to_string()));
        }
        if self.wait_time_secs == 0 {
            return Err(ConfigError::Invalid(
                "waitTimeSecs must be positive".to_string(),
            ));
        }
        if let Some(seconds) = self.expiration_seconds {
            if seconds < MIN_EXPIRATION_SECONDS {
                return Err(ConfigError::Invalid(format!(
                    "expirationSeconds must be at least {}",
                    MIN_EXPIRATION_SECONDS
                )));
            }
        }
        Ok(())
    }

    /// Upper bound on the wait for issuance.
    pub fn wait_time(&self) -> Duration {
        Duration::from_secs(self.wait_time_secs)
    }

    /// Key usages to request, falling back to [`DEFAULT_KEY_USAGES`].
    pub fn key_usages(&self) -> Vec<String> {
        if self.csr.key_usages.is_empty() {
            DEFAULT_KEY_USAGES.iter().map(|u| u.to_string()).collect()
        } else {
            self.csr.key_usages.clone()
        }
    }
}
