//! edgecert bootstrap requester.
//!
//! Obtains a node certificate through the cluster's CertificateSigningRequest
//! API and persists the resulting credential set for mutual TLS.

pub mod config;
pub mod csr;
pub mod error;
pub mod orchestrator;
pub mod provision;
pub mod store;

pub use config::RequesterConfig;
pub use error::{ConfigError, ProvisioningError};
pub use orchestrator::{CertificateApi, CsrState, CsrSubmission, KubeCertificateApi};
pub use provision::{ProvisionedArtifacts, Provisioner};
