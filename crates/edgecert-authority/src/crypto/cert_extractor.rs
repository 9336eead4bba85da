//! Certificate and CSR field extraction.
//!
//! Reads the fields the signer and the assembler care about out of DER
//! encoded X.509 structures.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;
use x509_parser::prelude::*;

/// Errors that can occur during certificate extraction.
#[derive(Debug, Error)]
pub enum CertExtractError {
    #[error("failed to parse certificate: {0}")]
    ParseError(String),

    #[error("name does not contain a Common Name (CN)")]
    MissingCn,

    #[error("failed to decode Common Name: {0}")]
    InvalidCn(String),

    #[error("validity timestamp out of range")]
    InvalidValidity,
}

/// Fields of an X.509 certificate relevant to issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDetails {
    /// Subject Common Name, if the subject has one.
    pub subject_cn: Option<String>,

    /// Subject distinguished name (RFC 4514 string).
    pub subject: String,

    /// Issuer distinguished name (RFC 4514 string).
    pub issuer: String,

    /// Serial number, lowercase hex.
    pub serial_hex: String,

    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,

    /// Whether the certificate carries `basicConstraints: CA:TRUE`.
    pub is_ca: bool,

    /// SHA-256 over the DER encoding, lowercase hex.
    pub fingerprint: String,
}

/// Parse a DER-encoded X.509 certificate.
///
/// A subject without a CN yields `subject_cn: None`.
pub fn inspect_certificate(cert_der: &[u8]) -> Result<CertificateDetails, CertExtractError> {
    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| CertExtractError::ParseError(format!("{:?}", e)))?;

    let subject_cn = match extract_common_name(cert.subject()) {
        Ok(cn) => Some(cn),
        Err(CertExtractError::MissingCn) => None,
        Err(e) => return Err(e),
    };
    let validity = cert.validity();

    Ok(CertificateDetails {
        subject_cn,
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        serial_hex: hex::encode(cert.raw_serial()),
        not_before: to_utc(validity.not_before)?,
        not_after: to_utc(validity.not_after)?,
        is_ca: cert.is_ca(),
        fingerprint: fingerprint(cert_der),
    })
}

/// Extract the first Common Name of an X.509 name.
pub fn extract_common_name(name: &X509Name<'_>) -> Result<String, CertExtractError> {
    match name.iter_common_name().next() {
        Some(attr) => attr
            .as_str()
            .map(|s| s.to_string())
            .map_err(|e| CertExtractError::InvalidCn(format!("{:?}", e))),
        None => Err(CertExtractError::MissingCn),
    }
}

/// SHA-256 fingerprint of DER bytes.
pub fn fingerprint(der: &[u8]) -> String {
    hex::encode(Sha256::digest(der))
}

fn to_utc(time: ASN1Time) -> Result<DateTime<Utc>, CertExtractError> {
    DateTime::from_timestamp(time.timestamp(), 0).ok_or(CertExtractError::InvalidValidity)
}
