//! Node key pair and CSR generation.
//!
//! The private key is generated locally and never leaves the node; only the
//! CSR is submitted to the orchestrator.

use rcgen::{CertificateParams, DistinguishedName, DnType, DnValue, KeyPair, SanType};

use crate::config::CsrConfig;
use crate::error::ProvisioningError;

/// A freshly generated key pair and the CSR built from it.
pub struct NodeCertRequest {
    key_pair: KeyPair,
    csr_pem: String,
}

impl NodeCertRequest {
    /// Generate a new key pair and a CSR for `config`.
    pub fn generate(config: &CsrConfig) -> Result<Self, ProvisioningError> {
        let key_pair = KeyPair::generate().map_err(|e| {
            ProvisioningError::KeyGeneration(format!("failed to generate node key: {}", e))
        })?;

        let mut params = CertificateParams::new(config.dns_sans.clone()).map_err(|e| {
            ProvisioningError::KeyGeneration(format!("invalid DNS SAN: {}", e))
        })?;
        params
            .subject_alt_names
            .extend(config.ip_sans.iter().copied().map(SanType::IpAddress));

        let mut dn = DistinguishedName::new();
        dn.push(
            DnType::CommonName,
            DnValue::Utf8String(config.subject.common_name.clone()),
        );
        if let Some(org) = config.subject.organization.first() {
            dn.push(DnType::OrganizationName, DnValue::Utf8String(org.clone()));
        }
        params.distinguished_name = dn;

        let csr = params.serialize_request(&key_pair).map_err(|e| {
            ProvisioningError::KeyGeneration(format!("failed to create CSR: {}", e))
        })?;
        let csr_pem = csr.pem().map_err(|e| {
            ProvisioningError::KeyGeneration(format!("failed to serialize CSR: {}", e))
        })?;

        Ok(Self { key_pair, csr_pem })
    }

    /// The CSR in PEM format.
    pub fn csr_pem(&self) -> &str {
        &self.csr_pem
    }

    /// The private key in PEM format.
    pub fn private_key_pem(&self) -> String {
        self.key_pair.serialize_pem()
    }

    /// Raw public key, as it appears in a certificate's SPKI.
    pub fn public_key_raw(&self) -> &[u8] {
        self.key_pair.public_key_raw()
    }
}
