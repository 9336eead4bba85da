//! Credential bundle assembly.
//!
//! Turns an issued certificate and the CA chain into the PEM bundle handed
//! back to applications.

use ::pem::{EncodeConfig, LineEnding, Pem};
use thiserror::Error;

use edgecert_core::CredentialBundle;

use super::ca::{CertificateAuthority, SignedCertificate};

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// Errors that can occur while encoding a bundle.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("issued certificate is empty")]
    EmptyCertificate,

    #[error("issued certificate has no subject Common Name")]
    MissingId,

    #[error("CA chain is empty")]
    EmptyChain,

    #[error("PEM encoding of {0} failed")]
    Pem(&'static str),
}

/// Build the credential bundle for an issued certificate.
///
/// `caChain` carries every certificate of the CA chain (signing CA first);
/// `caPool` carries the trust anchor only. Output is deterministic for the
/// same inputs.
pub fn assemble(
    cert: &SignedCertificate,
    ca: &CertificateAuthority,
) -> Result<CredentialBundle, EncodingError> {
    if cert.subject_cn.is_empty() {
        return Err(EncodingError::MissingId);
    }

    if cert.raw_der.is_empty() {
        return Err(EncodingError::EmptyCertificate);
    }
    let certificate =
        encode_certificate(&cert.raw_der).ok_or(EncodingError::Pem("issued certificate"))?;

    if ca.chain_der().is_empty() {
        return Err(EncodingError::EmptyChain);
    }
    let ca_chain = ca
        .chain_der()
        .iter()
        .map(|der| encode_certificate(der).ok_or(EncodingError::Pem("CA certificate")))
        .collect::<Result<Vec<_>, _>>()?;
    let ca_pool =
        vec![encode_certificate(ca.root_der()).ok_or(EncodingError::Pem("CA certificate"))?];

    Ok(CredentialBundle {
        id: cert.subject_cn.clone(),
        certificate,
        ca_chain,
        ca_pool,
    })
}

/// PEM-encode a DER certificate with LF line endings.
///
/// Returns `None` for empty input or when the output does not decode back
/// to the same bytes.
pub fn encode_certificate(der: &[u8]) -> Option<String> {
    if der.is_empty() {
        return None;
    }

    let block = Pem::new(CERTIFICATE_TAG, der.to_vec());
    let encoded = ::pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF));

    match ::pem::parse(&encoded) {
        Ok(decoded) if decoded.tag() == CERTIFICATE_TAG && decoded.contents() == der => {
            Some(encoded)
        }
        _ => None,
    }
}
