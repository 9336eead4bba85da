//! mTLS configuration from provisioned node credentials.
//!
//! The bootstrap requester leaves a node credential set on disk. This module
//! loads it and builds tonic TLS configs from it:
//! 1. Server configs require clients to present certificates signed by the
//!    CA pool (`client_ca_root`), so unauthenticated peers are rejected by
//!    the TLS layer itself
//! 2. Client configs present the node's client identity and verify the
//!    server against the same pool

use std::path::Path;

use thiserror::Error;
use tonic::transport::{Certificate, ClientTlsConfig, Identity, ServerTlsConfig};

use edgecert_core::{ArtifactKind, ArtifactLayout};

/// Errors that can occur while loading node credentials.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {kind} from '{path}': {source}")]
    Read {
        kind: ArtifactKind,
        path: String,
        source: std::io::Error,
    },

    #[error("{0} does not contain a PEM block")]
    NotPem(ArtifactKind),
}

/// Node credentials loaded from a bootstrap artifact directory.
#[derive(Debug, Clone)]
pub struct NodeCredentials {
    key: Vec<u8>,
    cert: Vec<u8>,
    client_key: Vec<u8>,
    client_cert: Vec<u8>,
    ca_pool: Vec<u8>,
}

impl NodeCredentials {
    /// Load every artifact of the credential set in `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, TlsError> {
        let layout = ArtifactLayout::new(dir.as_ref());
        Ok(Self {
            key: read_pem(&layout, ArtifactKind::Key)?,
            cert: read_pem(&layout, ArtifactKind::Cert)?,
            client_key: read_pem(&layout, ArtifactKind::ClientKey)?,
            client_cert: read_pem(&layout, ArtifactKind::ClientCert)?,
            ca_pool: read_pem(&layout, ArtifactKind::RootCa)?,
        })
    }

    /// Server TLS config that requires client certificates from the CA pool.
    pub fn server_tls_config(&self) -> ServerTlsConfig {
        ServerTlsConfig::new()
            .identity(Identity::from_pem(&self.cert, &self.key))
            .client_ca_root(Certificate::from_pem(&self.ca_pool))
    }

    /// Client TLS config presenting the node's client identity.
    pub fn client_tls_config(&self, domain: Option<&str>) -> ClientTlsConfig {
        let config = ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(&self.ca_pool))
            .identity(Identity::from_pem(&self.client_cert, &self.client_key));
        match domain {
            Some(domain) => config.domain_name(domain),
            None => config,
        }
    }
}

fn read_pem(layout: &ArtifactLayout, kind: ArtifactKind) -> Result<Vec<u8>, TlsError> {
    let path = layout.path(kind);
    let contents = std::fs::read(&path).map_err(|source| TlsError::Read {
        kind,
        path: path.display().to_string(),
        source,
    })?;
    if !contents.windows(11).any(|w| w == b"-----BEGIN ") {
        return Err(TlsError::NotPem(kind));
    }
    Ok(contents)
}
