//! Orchestrator certificate signing request API.
//!
//! Submits `certificates.k8s.io/v1` CertificateSigningRequest objects and
//! waits for the signer to act on them. Approval itself is left to the
//! cluster's approval workflow.

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::certificates::v1::{
    CertificateSigningRequest, CertificateSigningRequestSpec, CertificateSigningRequestStatus,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::ProvisioningError;

/// Default pause between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A CSR ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrSubmission {
    pub name: String,
    pub csr_pem: String,
    pub signer_name: String,
    pub usages: Vec<String>,
    pub expiration_seconds: Option<i32>,
}

/// Observed state of a submitted CSR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsrState {
    /// Not signed yet (possibly approved).
    Pending,
    /// Signed; holds the PEM certificate returned by the signer.
    Issued(Vec<u8>),
    Denied(String),
    Failed(String),
}

impl CsrState {
    /// Derive the state from a CSR status.
    ///
    /// A `Denied` or `Failed` condition wins over an attached certificate.
    pub fn from_status(status: Option<&CertificateSigningRequestStatus>) -> Self {
        let Some(status) = status else {
            return CsrState::Pending;
        };

        for condition in status.conditions.iter().flatten() {
            if condition.status != "True" {
                continue;
            }
            let reason = || {
                condition
                    .message
                    .clone()
                    .or_else(|| condition.reason.clone())
                    .unwrap_or_else(|| "no reason given".to_string())
            };
            match condition.type_.as_str() {
                "Denied" => return CsrState::Denied(reason()),
                "Failed" => return CsrState::Failed(reason()),
                _ => {}
            }
        }

        match &status.certificate {
            Some(cert) if !cert.0.is_empty() => CsrState::Issued(cert.0.clone()),
            _ => CsrState::Pending,
        }
    }
}

/// Cluster CSR operations used by the provisioning flow.
#[async_trait]
pub trait CertificateApi: Send + Sync {
    /// Delete the CSR object `name`. Returns whether one existed.
    async fn delete(&self, name: &str) -> Result<bool, ProvisioningError>;

    /// Create a CSR object.
    async fn create(&self, submission: &CsrSubmission) -> Result<(), ProvisioningError>;

    /// Read the current state of the CSR object `name`.
    async fn state(&self, name: &str) -> Result<CsrState, ProvisioningError>;
}

/// [`CertificateApi`] backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeCertificateApi {
    api: Api<CertificateSigningRequest>,
}

impl KubeCertificateApi {
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }
}

#[async_trait]
impl CertificateApi for KubeCertificateApi {
    async fn delete(&self, name: &str) -> Result<bool, ProvisioningError> {
        match self.api.delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, submission: &CsrSubmission) -> Result<(), ProvisioningError> {
        let csr = CertificateSigningRequest {
            metadata: ObjectMeta {
                name: Some(submission.name.clone()),
                ..Default::default()
            },
            spec: CertificateSigningRequestSpec {
                request: ByteString(submission.csr_pem.clone().into_bytes()),
                signer_name: submission.signer_name.clone(),
                usages: Some(submission.usages.clone()),
                expiration_seconds: submission.expiration_seconds,
                ..Default::default()
            },
            status: None,
        };
        self.api.create(&PostParams::default(), &csr).await?;
        Ok(())
    }

    async fn state(&self, name: &str) -> Result<CsrState, ProvisioningError> {
        let csr = self.api.get(name).await?;
        Ok(CsrState::from_status(csr.status.as_ref()))
    }
}

/// Replace any stale CSR named like `submission` and submit it.
pub async fn submit<A: CertificateApi + ?Sized>(
    api: &A,
    submission: &CsrSubmission,
) -> Result<(), ProvisioningError> {
    if api.delete(&submission.name).await? {
        info!(name = %submission.name, "Deleted stale certificate signing request");
    }
    api.create(submission).await?;
    info!(
        name = %submission.name,
        signer = %submission.signer_name,
        "Certificate signing request submitted"
    );
    Ok(())
}

/// Poll the CSR `name` until it is issued, denied, failed or `wait` elapses.
///
/// Returns the issued PEM certificate.
pub async fn await_certificate<A: CertificateApi + ?Sized>(
    api: &A,
    name: &str,
    wait: Duration,
    poll_interval: Duration,
) -> Result<Vec<u8>, ProvisioningError> {
    let deadline = Instant::now() + wait;

    loop {
        match api.state(name).await? {
            CsrState::Issued(cert) => return Ok(cert),
            CsrState::Denied(reason) => {
                return Err(ProvisioningError::Denied {
                    name: name.to_string(),
                    reason,
                })
            }
            CsrState::Failed(reason) => {
                return Err(ProvisioningError::Failed {
                    name: name.to_string(),
                    reason,
                })
            }
            CsrState::Pending => {}
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(ProvisioningError::Timeout {
                name: name.to_string(),
                waited: wait,
            });
        }
        debug!(name = %name, "Certificate not issued yet");
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}
