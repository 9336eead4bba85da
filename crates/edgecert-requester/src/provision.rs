//! Node credential provisioning flow.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ::pem::{EncodeConfig, LineEnding, Pem};
use chrono::{DateTime, Utc};
use tracing::info;
use x509_parser::prelude::*;

use edgecert_core::{ArtifactKind, ArtifactLayout};

use crate::config::RequesterConfig;
use crate::csr::NodeCertRequest;
use crate::error::ProvisioningError;
use crate::orchestrator::{
    await_certificate, submit, CertificateApi, CsrSubmission, DEFAULT_POLL_INTERVAL,
};
use crate::store::{ArtifactSet, ArtifactStore};

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// Result of a successful provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionedArtifacts {
    /// Directory holding the artifacts.
    pub output_dir: PathBuf,

    /// Files written, in write order.
    pub files: Vec<PathBuf>,

    /// Serial number of the issued certificate, lowercase hex.
    pub serial_number: String,

    pub not_after: DateTime<Utc>,
}

/// Drives one provisioning run against a [`CertificateApi`].
pub struct Provisioner<A> {
    api: A,
    cluster_ca: Vec<Vec<u8>>,
    poll_interval: Duration,
}

impl<A: CertificateApi> Provisioner<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cluster_ca: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Cluster CA certificates (DER), issuing CA first.
    pub fn with_cluster_ca(mut self, ca_der: Vec<Vec<u8>>) -> Self {
        self.cluster_ca = ca_der;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Provision node credentials as described by the config at `config_path`.
    pub async fn provision(
        &self,
        config_path: impl AsRef<Path>,
    ) -> Result<ProvisionedArtifacts, ProvisioningError> {
        let config = RequesterConfig::load(config_path)?;
        self.provision_with(&config).await
    }

    /// Provision node credentials for an already loaded config.
    ///
    /// Nothing is written unless the certificate was issued for the
    /// generated key.
    pub async fn provision_with(
        &self,
        config: &RequesterConfig,
    ) -> Result<ProvisionedArtifacts, ProvisioningError> {
        let (ca_chain, root_ca) = self.encode_cluster_ca()?;

        let request = NodeCertRequest::generate(&config.csr)?;
        let submission = CsrSubmission {
            name: config.csr.name.clone(),
            csr_pem: request.csr_pem().to_string(),
            signer_name: config.signer.clone(),
            usages: config.key_usages(),
            expiration_seconds: config.expiration_seconds,
        };

        submit(&self.api, &submission).await?;
        let issued = await_certificate(
            &self.api,
            &submission.name,
            config.wait_time(),
            self.poll_interval,
        )
        .await?;

        let (cert_pem, details) = verify_issued(&issued, request.public_key_raw())?;
        info!(
            name = %submission.name,
            serial = %details.serial_number,
            expires_at = %details.not_after,
            "Certificate issued"
        );

        let key_pem = request.private_key_pem();
        let mut set = ArtifactSet::new();
        set.insert(ArtifactKind::Key, key_pem.clone())
            .insert(ArtifactKind::Cert, cert_pem.clone())
            .insert(ArtifactKind::CaChain, ca_chain)
            .insert(ArtifactKind::RootCa, root_ca)
            .insert(ArtifactKind::ClientKey, key_pem)
            .insert(ArtifactKind::ClientCert, cert_pem);

        let store = ArtifactStore::new(ArtifactLayout::new(&config.output_dir));
        let files = store.commit(&set)?;
        info!(dir = %config.output_dir.display(), "Node credentials written");

        Ok(ProvisionedArtifacts {
            output_dir: config.output_dir.clone(),
            files,
            serial_number: details.serial_number,
            not_after: details.not_after,
        })
    }

    /// PEM chain of every cluster CA certificate, and the trust anchor alone.
    fn encode_cluster_ca(&self) -> Result<(String, String), ProvisioningError> {
        let root = self
            .cluster_ca
            .last()
            .ok_or(ProvisioningError::MissingClusterCa)?;
        let chain: Vec<Pem> = self
            .cluster_ca
            .iter()
            .map(|der| Pem::new(CERTIFICATE_TAG, der.clone()))
            .collect();
        Ok((encode_pem(&chain), encode_pem(&[Pem::new(CERTIFICATE_TAG, root.clone())])))
    }
}

struct IssuedDetails {
    serial_number: String,
    not_after: DateTime<Utc>,
}

/// Check that `issued` holds certificates and certifies `public_key`.
///
/// Returns the normalized PEM (every certificate block, LF endings).
fn verify_issued(
    issued: &[u8],
    public_key: &[u8],
) -> Result<(String, IssuedDetails), ProvisioningError> {
    let invalid = |msg: String| ProvisioningError::InvalidCertificate(msg);

    let blocks: Vec<Pem> = ::pem::parse_many(issued)
        .map_err(|e| invalid(e.to_string()))?
        .into_iter()
        .filter(|p| p.tag() == CERTIFICATE_TAG)
        .collect();
    let leaf = blocks
        .first()
        .ok_or_else(|| invalid("no certificate in signer response".to_string()))?;

    let (_, cert) =
        X509Certificate::from_der(leaf.contents()).map_err(|e| invalid(e.to_string()))?;
    if cert.public_key().subject_public_key.data.as_ref() != public_key {
        return Err(invalid(
            "certificate does not certify the generated key".to_string(),
        ));
    }

    let not_after = DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0)
        .ok_or_else(|| invalid("certificate expiry out of range".to_string()))?;
    let details = IssuedDetails {
        serial_number: hex::encode(cert.raw_serial()),
        not_after,
    };

    Ok((encode_pem(&blocks), details))
}

fn encode_pem(blocks: &[Pem]) -> String {
    ::pem::encode_many_config(blocks, EncodeConfig::new().set_line_ending(LineEnding::LF))
}
