//! Credential request and response entities.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Identity claim sent by an application asking for credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRequest {
    /// Certificate Signing Request (PEM encoded).
    #[serde(default)]
    pub csr: String,
}

impl CredentialRequest {
    /// Create a request for the given CSR.
    pub fn new(csr: impl Into<String>) -> Self {
        Self { csr: csr.into() }
    }

    /// Check required fields before any other processing happens.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.csr.trim().is_empty() {
            return Err(CoreError::MissingField("csr"));
        }
        Ok(())
    }
}

/// Credentials handed back to an authorized application.
///
/// Built fresh for every request and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialBundle {
    /// Common name of the issued certificate.
    pub id: String,

    /// Issued leaf certificate (PEM encoded).
    pub certificate: String,

    /// Certificates to present alongside the leaf (PEM encoded).
    pub ca_chain: Vec<String>,

    /// Trust anchors for verifying peers (PEM encoded).
    pub ca_pool: Vec<String>,
}
