//! Certificate Authority for signing application CSRs.
//!
//! Uses x509-parser to inspect CSRs and rcgen to issue certificates.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rcgen::{
    Certificate, CertificateParams, CertificateSigningRequestParams, ExtendedKeyUsagePurpose,
    IsCa, KeyPair, KeyUsagePurpose,
};
use thiserror::Error;
use ::time::OffsetDateTime;
use tracing::warn;
use x509_parser::oid_registry::{Oid, OID_PKCS1_RSAENCRYPTION};
use x509_parser::prelude::*;

use super::cert_extractor::{extract_common_name, inspect_certificate, CertificateDetails};
use super::serial::SerialAllocator;

/// Upper bound for the Common Name (X.520 ub-common-name).
pub const MAX_COMMON_NAME_LEN: usize = 64;

/// Errors that can occur while loading the CA.
#[derive(Debug, Error)]
pub enum CaError {
    #[error("failed to read CA certificate: {0}")]
    ReadCert(std::io::Error),

    #[error("failed to read CA private key: {0}")]
    ReadKey(std::io::Error),

    #[error("failed to parse CA certificate: {0}")]
    ParseCert(String),

    #[error("failed to parse CA private key: {0}")]
    ParseKey(String),

    #[error("CA certificate file contains no certificate")]
    EmptyChain,

    #[error("certificate '{0}' is not a CA certificate")]
    NotCa(String),

    #[error("CA private key does not match the CA certificate")]
    KeyMismatch,

    #[error("CA certificate expired at {0}")]
    Expired(DateTime<Utc>),

    #[error("certificate validity must be at least one day")]
    InvalidValidity,
}

/// Errors that can occur while signing a CSR.
///
/// Each variant is a distinct failure class for the caller.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The CSR could not be decoded or its signature does not verify.
    #[error("malformed CSR: {0}")]
    MalformedRequest(String),

    /// The CSR is well formed but asks for something the CA does not issue.
    #[error("CSR rejected by policy: {0}")]
    PolicyViolation(String),

    /// The CA could not produce a certificate.
    #[error("failed to sign certificate: {0}")]
    Internal(String),
}

/// Certificate Authority that signs application certificates.
pub struct CertificateAuthority {
    /// CA certificates (DER), signing CA first, trust anchor last.
    chain_der: Vec<Vec<u8>>,

    /// Signing CA re-created from its parameters, used as issuer.
    issuer: Certificate,

    /// CA key pair.
    key_pair: KeyPair,

    /// Parsed signing CA certificate.
    details: CertificateDetails,

    /// Certificate validity in days.
    validity_days: u32,

    serials: SerialAllocator,
}

impl CertificateAuthority {
    /// Load CA from certificate and key files.
    ///
    /// The certificate file may hold a chain: the signing CA first, followed
    /// by its issuers up to the root.
    pub fn from_files(
        cert_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
        validity_days: u32,
    ) -> Result<Self, CaError> {
        let ca_cert_pem = std::fs::read_to_string(cert_path).map_err(CaError::ReadCert)?;
        let ca_key_pem = std::fs::read_to_string(key_path).map_err(CaError::ReadKey)?;
        Self::from_pem(&ca_cert_pem, &ca_key_pem, validity_days)
    }

    /// Load CA from PEM strings.
    pub fn from_pem(
        ca_cert_pem: &str,
        ca_key_pem: &str,
        validity_days: u32,
    ) -> Result<Self, CaError> {
        if validity_days == 0 {
            return Err(CaError::InvalidValidity);
        }

        let chain_der: Vec<Vec<u8>> = ::pem::parse_many(ca_cert_pem)
            .map_err(|e| CaError::ParseCert(e.to_string()))?
            .into_iter()
            .filter(|p| p.tag() == "CERTIFICATE")
            .map(|p| p.into_contents())
            .collect();
        let signing_der = chain_der.first().ok_or(CaError::EmptyChain)?;

        let details =
            inspect_certificate(signing_der).map_err(|e| CaError::ParseCert(e.to_string()))?;
        if !details.is_ca {
            return Err(CaError::NotCa(details.subject));
        }
        if details.not_after <= Utc::now() {
            return Err(CaError::Expired(details.not_after));
        }

        let ca_key_pair =
            KeyPair::from_pem(ca_key_pem).map_err(|e| CaError::ParseKey(e.to_string()))?;

        let (_, parsed) = X509Certificate::from_der(signing_der)
            .map_err(|e| CaError::ParseCert(e.to_string()))?;
        if parsed.public_key().subject_public_key.data.as_ref() != ca_key_pair.public_key_raw() {
            return Err(CaError::KeyMismatch);
        }

        // Re-create the issuer from the loaded certificate so issued
        // certificates carry its exact subject and key identifier.
        let signing_pem = ::pem::encode(&::pem::Pem::new("CERTIFICATE", signing_der.clone()));
        let ca_params = CertificateParams::from_ca_cert_pem(&signing_pem)
            .map_err(|e| CaError::ParseCert(e.to_string()))?;
        let issuer = ca_params
            .self_signed(&ca_key_pair)
            .map_err(|e| CaError::ParseCert(e.to_string()))?;

        if chain_der.len() > 1 {
            let root = inspect_certificate(&chain_der[chain_der.len() - 1])
                .map_err(|e| CaError::ParseCert(e.to_string()))?;
            if !root.is_ca {
                warn!(subject = %root.subject, "Last certificate of the CA chain is not a CA");
            }
        }

        Ok(Self {
            chain_der,
            issuer,
            key_pair: ca_key_pair,
            details,
            validity_days,
            serials: SerialAllocator::new(),
        })
    }

    /// Subject of the signing CA (RFC 4514 string).
    pub fn subject(&self) -> &str {
        &self.details.subject
    }

    /// CA certificates (DER), signing CA first.
    pub fn chain_der(&self) -> &[Vec<u8>] {
        &self.chain_der
    }

    /// Trust anchor of the chain (DER).
    pub fn root_der(&self) -> &[u8] {
        // from_pem guarantees a non-empty chain
        self.chain_der.last().map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of certificates issued by this CA since it was loaded.
    pub fn issued_count(&self) -> u64 {
        self.serials.allocated()
    }

    /// Sign a Certificate Signing Request (CSR).
    ///
    /// The issued certificate certifies the CSR's public key under the CSR's
    /// own subject. Requested SANs are kept; every other requested extension
    /// is replaced by the CA's leaf profile.
    pub fn sign(&self, csr_pem: &str) -> Result<SignedCertificate, SigningError> {
        self.sign_for(csr_pem, None)
    }

    /// Sign a CSR, additionally requiring its Common Name to equal
    /// `expected_cn` when one is given.
    ///
    /// A mismatch is a [`SigningError::PolicyViolation`] and consumes no
    /// serial number.
    pub fn sign_for(
        &self,
        csr_pem: &str,
        expected_cn: Option<&str>,
    ) -> Result<SignedCertificate, SigningError> {
        // Parse the CSR using x509-parser
        let pem =
            ::pem::parse(csr_pem).map_err(|e| SigningError::MalformedRequest(e.to_string()))?;
        if !matches!(pem.tag(), "CERTIFICATE REQUEST" | "NEW CERTIFICATE REQUEST") {
            return Err(SigningError::MalformedRequest(format!(
                "unexpected PEM block '{}'",
                pem.tag()
            )));
        }

        let csr = X509CertificationRequest::from_der(pem.contents())
            .map_err(|e| SigningError::MalformedRequest(e.to_string()))?
            .1;

        let subject_cn = extract_common_name(&csr.certification_request_info.subject)
            .map_err(|e| SigningError::PolicyViolation(e.to_string()))?;
        check_common_name(&subject_cn)?;
        if let Some(expected) = expected_cn {
            if subject_cn != expected {
                return Err(SigningError::PolicyViolation(format!(
                    "Common Name '{}' does not match application '{}'",
                    subject_cn, expected
                )));
            }
        }
        let key_usages =
            leaf_key_usages(&csr.certification_request_info.subject_pki.algorithm.algorithm);

        // Verifies the CSR signature (proof of possession)
        let mut csr_params = CertificateSigningRequestParams::from_pem(csr_pem)
            .map_err(|e| SigningError::MalformedRequest(e.to_string()))?;

        let (not_before, not_after) =
            validity_window(Utc::now(), self.validity_days, self.details.not_after)?;
        let params = &mut csr_params.params;
        params.serial_number = Some(self.serials.next_serial());
        params.not_before = not_before;
        params.not_after = not_after;
        params.is_ca = IsCa::ExplicitNoCa;
        params.key_usages = key_usages;
        params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
        ];
        params.name_constraints = None;
        params.crl_distribution_points.clear();
        params.custom_extensions.clear();
        params.use_authority_key_identifier_extension = true;

        let cert = csr_params
            .signed_by(&self.issuer, &self.key_pair)
            .map_err(|e| SigningError::Internal(e.to_string()))?;

        let raw_der = cert.der().to_vec();
        let details =
            inspect_certificate(&raw_der).map_err(|e| SigningError::Internal(e.to_string()))?;
        if details.subject_cn.as_deref() != Some(subject_cn.as_str()) {
            return Err(SigningError::Internal(format!(
                "issued subject '{}' differs from requested '{}'",
                details.subject, subject_cn
            )));
        }

        Ok(SignedCertificate {
            subject_cn,
            serial_number: details.serial_hex,
            not_before: details.not_before,
            not_after: details.not_after,
            fingerprint: details.fingerprint,
            raw_der,
        })
    }
}

/// Validity of a certificate issued at `now`, never outliving the CA.
///
/// Bounds are exact to the second. An empty window is an error.
fn validity_window(
    now: DateTime<Utc>,
    validity_days: u32,
    ca_not_after: DateTime<Utc>,
) -> Result<(OffsetDateTime, OffsetDateTime), SigningError> {
    let requested = now + Duration::days(i64::from(validity_days));
    let not_before = to_offset(now)?;
    let not_after = to_offset(requested.min(ca_not_after))?;
    if not_after <= not_before {
        return Err(SigningError::Internal(format!(
            "CA certificate expires at {}, nothing left to issue",
            ca_not_after
        )));
    }
    Ok((not_before, not_after))
}

fn to_offset(time: DateTime<Utc>) -> Result<OffsetDateTime, SigningError> {
    OffsetDateTime::from_unix_timestamp(time.timestamp())
        .map_err(|e| SigningError::Internal(e.to_string()))
}

/// Key usages of a leaf certifying a key of algorithm `spki_alg`.
///
/// Key encipherment only applies to RSA keys.
fn leaf_key_usages(spki_alg: &Oid<'_>) -> Vec<KeyUsagePurpose> {
    let mut usages = vec![KeyUsagePurpose::DigitalSignature];
    if *spki_alg == OID_PKCS1_RSAENCRYPTION {
        usages.push(KeyUsagePurpose::KeyEncipherment);
    }
    usages
}

/// A certificate issued by the CA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificate {
    /// Common Name of the subject.
    pub subject_cn: String,

    /// Serial number, lowercase hex.
    pub serial_number: String,

    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,

    /// SHA-256 fingerprint, lowercase hex.
    pub fingerprint: String,

    /// DER encoding of the certificate.
    pub raw_der: Vec<u8>,
}

fn check_common_name(cn: &str) -> Result<(), SigningError> {
    if cn.trim().is_empty() {
        return Err(SigningError::PolicyViolation(
            "Common Name cannot be empty".to_string(),
        ));
    }
    if cn.chars().count() > MAX_COMMON_NAME_LEN {
        return Err(SigningError::PolicyViolation(format!(
            "Common Name longer than {} characters",
            MAX_COMMON_NAME_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use rcgen::{DistinguishedName, DnType, SanType};

    use super::*;

    fn generate_ca() -> (String, String) {
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "Test CA");
        dn.push(DnType::OrganizationName, "Edge");
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];

        let key_pair = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        (cert.pem(), key_pair.serialize_pem())
    }

    fn test_ca() -> CertificateAuthority {
        let (cert, key) = generate_ca();
        CertificateAuthority::from_pem(&cert, &key, 30).unwrap()
    }

    fn generate_csr(cn: &str) -> String {
        let mut params = CertificateParams::new(vec!["app.local".to_string()]).unwrap();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, cn);
        params.distinguished_name = dn;

        let key_pair = KeyPair::generate().unwrap();
        params.serialize_request(&key_pair).unwrap().pem().unwrap()
    }

    #[test]
    fn test_sign_binds_subject_and_issuer() {
        let ca = test_ca();
        let signed = ca.sign(&generate_csr("app-1")).unwrap();

        assert_eq!(signed.subject_cn, "app-1");
        let details = inspect_certificate(&signed.raw_der).unwrap();
        assert_eq!(details.issuer, ca.subject());
        assert!(!details.is_ca);
        assert!(signed.not_before < signed.not_after);
        assert_eq!(ca.issued_count(), 1);
    }

    #[test]
    fn test_sign_certifies_csr_public_key() {
        let ca = test_ca();
        let key_pair = KeyPair::generate().unwrap();
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "app-key");
        params.distinguished_name = dn;
        let csr = params.serialize_request(&key_pair).unwrap().pem().unwrap();

        let signed = ca.sign(&csr).unwrap();
        let (_, cert) = X509Certificate::from_der(&signed.raw_der).unwrap();
        assert_eq!(
            cert.public_key().subject_public_key.data.as_ref(),
            key_pair.public_key_raw()
        );
    }

    #[test]
    fn test_sign_sets_mutual_tls_usages() {
        let ca = test_ca();
        let signed = ca.sign(&generate_csr("app-1")).unwrap();
        let (_, cert) = X509Certificate::from_der(&signed.raw_der).unwrap();

        let eku = cert.extended_key_usage().unwrap().unwrap().value;
        assert!(eku.server_auth);
        assert!(eku.client_auth);

        let ku = cert.key_usage().unwrap().unwrap().value;
        assert!(ku.digital_signature());
        assert!(!ku.key_cert_sign());
        // ECDSA subject key
        assert!(!ku.key_encipherment());
    }

    #[test]
    fn test_leaf_key_usages_by_algorithm() {
        use x509_parser::oid_registry::OID_KEY_TYPE_EC_PUBLIC_KEY;

        assert_eq!(
            leaf_key_usages(&OID_PKCS1_RSAENCRYPTION),
            vec![
                KeyUsagePurpose::DigitalSignature,
                KeyUsagePurpose::KeyEncipherment
            ]
        );
        assert_eq!(
            leaf_key_usages(&OID_KEY_TYPE_EC_PUBLIC_KEY),
            vec![KeyUsagePurpose::DigitalSignature]
        );
    }

    #[test]
    fn test_sign_validity_is_exact() {
        let ca = test_ca();
        let before = Utc::now();
        let signed = ca.sign(&generate_csr("app-1")).unwrap();

        assert!((signed.not_before - before).num_seconds().abs() <= 2);
        assert_eq!(signed.not_after - signed.not_before, Duration::days(30));
    }

    #[test]
    fn test_sign_clamps_to_ca_expiry() {
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "Short CA");
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        params.not_after = OffsetDateTime::now_utc() + ::time::Duration::hours(2);
        let key_pair = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        let ca_not_after = inspect_certificate(cert.der()).unwrap().not_after;

        let ca = CertificateAuthority::from_pem(&cert.pem(), &key_pair.serialize_pem(), 30)
            .unwrap();
        let signed = ca.sign(&generate_csr("app-1")).unwrap();

        assert_eq!(signed.not_after, ca_not_after);
        assert!(signed.not_before < signed.not_after);
    }

    #[test]
    fn test_validity_window() {
        let now = DateTime::from_timestamp(1_800_000_123, 0).unwrap();

        let (not_before, not_after) = validity_window(now, 7, now + Duration::days(365)).unwrap();
        assert_eq!(not_before.unix_timestamp(), now.timestamp());
        assert_eq!(
            not_after.unix_timestamp(),
            (now + Duration::days(7)).timestamp()
        );

        let ca_not_after = now + Duration::minutes(90);
        let (_, not_after) = validity_window(now, 7, ca_not_after).unwrap();
        assert_eq!(not_after.unix_timestamp(), ca_not_after.timestamp());

        for ca_not_after in [now, now - Duration::hours(1), now + Duration::milliseconds(500)] {
            assert!(matches!(
                validity_window(now, 7, ca_not_after),
                Err(SigningError::Internal(_))
            ));
        }
    }

    #[test]
    fn test_sign_for_requires_matching_cn() {
        let ca = test_ca();

        let result = ca.sign_for(&generate_csr("app-2"), Some("app-1"));
        assert!(matches!(result, Err(SigningError::PolicyViolation(_))));
        assert_eq!(ca.issued_count(), 0);

        let signed = ca.sign_for(&generate_csr("app-1"), Some("app-1")).unwrap();
        assert_eq!(signed.subject_cn, "app-1");
        assert_eq!(ca.issued_count(), 1);
    }

    #[test]
    fn test_sign_keeps_requested_sans() {
        let ca = test_ca();
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "app-san");
        params.distinguished_name = dn;
        params.subject_alt_names = vec![SanType::DnsName("app-san.edge".try_into().unwrap())];
        let key_pair = KeyPair::generate().unwrap();
        let csr = params.serialize_request(&key_pair).unwrap().pem().unwrap();

        let signed = ca.sign(&csr).unwrap();
        let (_, cert) = X509Certificate::from_der(&signed.raw_der).unwrap();
        let san = cert.subject_alternative_name().unwrap().unwrap().value;
        assert!(san
            .general_names
            .iter()
            .any(|n| matches!(n, GeneralName::DNSName("app-san.edge"))));
    }

    #[test]
    fn test_sign_rejects_malformed_csr() {
        let ca = test_ca();

        for input in [
            "garbage",
            "-----BEGIN CERTIFICATE REQUEST-----\nAAAA\n-----END CERTIFICATE REQUEST-----\n",
        ] {
            let result = ca.sign(input);
            assert!(
                matches!(result, Err(SigningError::MalformedRequest(_))),
                "expected MalformedRequest for {:?}",
                input
            );
        }
        assert_eq!(ca.issued_count(), 0);
    }

    #[test]
    fn test_sign_rejects_certificate_instead_of_csr() {
        let ca = test_ca();
        let (cert_pem, _) = generate_ca();
        let result = ca.sign(&cert_pem);
        assert!(matches!(result, Err(SigningError::MalformedRequest(_))));
    }

    #[test]
    fn test_sign_rejects_missing_or_empty_cn() {
        let ca = test_ca();

        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::OrganizationName, "No CN");
        params.distinguished_name = dn;
        let key_pair = KeyPair::generate().unwrap();
        let csr = params.serialize_request(&key_pair).unwrap().pem().unwrap();
        assert!(matches!(
            ca.sign(&csr),
            Err(SigningError::PolicyViolation(_))
        ));

        assert!(matches!(
            ca.sign(&generate_csr("")),
            Err(SigningError::PolicyViolation(_))
        ));
        assert!(matches!(
            ca.sign(&generate_csr(&"a".repeat(MAX_COMMON_NAME_LEN + 1))),
            Err(SigningError::PolicyViolation(_))
        ));
    }

    #[test]
    fn test_concurrent_signing_yields_distinct_serials() {
        let ca = Arc::new(test_ca());
        let csr = generate_csr("app-1");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ca = ca.clone();
                let csr = csr.clone();
                std::thread::spawn(move || ca.sign(&csr).unwrap().serial_number)
            })
            .collect();

        let serials: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(serials.len(), 16);
        assert_eq!(ca.issued_count(), 16);
    }

    #[test]
    fn test_load_rejects_non_ca_certificate() {
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "leaf");
        params.distinguished_name = dn;
        let key_pair = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key_pair).unwrap();

        let result = CertificateAuthority::from_pem(&cert.pem(), &key_pair.serialize_pem(), 30);
        assert!(matches!(result, Err(CaError::NotCa(_))));
    }

    #[test]
    fn test_load_ca_without_common_name() {
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CountryName, "TT");
        dn.push(DnType::OrganizationName, "Edge Platform CA");
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        let key_pair = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key_pair).unwrap();

        let ca = CertificateAuthority::from_pem(&cert.pem(), &key_pair.serialize_pem(), 30)
            .unwrap();
        assert!(ca.subject().contains("O=Edge Platform CA"));

        let signed = ca.sign(&generate_csr("app-1")).unwrap();
        let details = inspect_certificate(&signed.raw_der).unwrap();
        assert_eq!(details.issuer, ca.subject());
        assert_eq!(details.subject_cn.as_deref(), Some("app-1"));
    }

    #[test]
    fn test_load_rejects_mismatched_key() {
        let (cert, _) = generate_ca();
        let (_, other_key) = generate_ca();
        let result = CertificateAuthority::from_pem(&cert, &other_key, 30);
        assert!(matches!(result, Err(CaError::KeyMismatch)));
    }

    #[test]
    fn test_load_rejects_empty_input() {
        let (_, key) = generate_ca();
        assert!(matches!(
            CertificateAuthority::from_pem("", &key, 30),
            Err(CaError::EmptyChain)
        ));

        let (cert, key) = generate_ca();
        assert!(matches!(
            CertificateAuthority::from_pem(&cert, &key, 0),
            Err(CaError::InvalidValidity)
        ));
    }

    #[test]
    fn test_load_chain_keeps_order() {
        let (root_pem, root_key_pem) = generate_ca();
        let root_key = KeyPair::from_pem(&root_key_pem).unwrap();
        let root = CertificateParams::from_ca_cert_pem(&root_pem)
            .unwrap()
            .self_signed(&root_key)
            .unwrap();

        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "Intermediate CA");
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        let intermediate_key = KeyPair::generate().unwrap();
        let intermediate = params
            .signed_by(&intermediate_key, &root, &root_key)
            .unwrap();

        let chain = format!("{}{}", intermediate.pem(), root_pem);
        let ca =
            CertificateAuthority::from_pem(&chain, &intermediate_key.serialize_pem(), 30).unwrap();

        assert_eq!(ca.chain_der().len(), 2);
        assert_eq!(ca.chain_der()[0], intermediate.der().to_vec());
        assert_eq!(ca.root_der(), ::pem::parse(&root_pem).unwrap().contents());

        let signed = ca.sign(&generate_csr("app-2")).unwrap();
        let details = inspect_certificate(&signed.raw_der).unwrap();
        assert_eq!(details.issuer, ca.subject());
        assert!(ca.subject().contains("Intermediate CA"));
    }
}
