//! On-disk layout of the node credentials written by the bootstrap requester.
//!
//! The requester writes every artifact into one directory; long-running
//! services later load the same files to configure mutual TLS.

use std::fmt;
use std::path::{Path, PathBuf};

/// A single file of the node credential set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    /// Server private key.
    Key,
    /// Server certificate.
    Cert,
    /// CA certificates presented with the leaf.
    CaChain,
    /// Trust anchor.
    RootCa,
    /// Client private key.
    ClientKey,
    /// Client certificate.
    ClientCert,
}

impl ArtifactKind {
    /// Every artifact, in the order they are written.
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::Key,
        ArtifactKind::Cert,
        ArtifactKind::CaChain,
        ArtifactKind::RootCa,
        ArtifactKind::ClientKey,
        ArtifactKind::ClientCert,
    ];

    /// File name inside the credential directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Key => "key.pem",
            ArtifactKind::Cert => "cert.pem",
            ArtifactKind::CaChain => "ca-chain.pem",
            ArtifactKind::RootCa => "root-ca.pem",
            ArtifactKind::ClientKey => "client-key.pem",
            ArtifactKind::ClientCert => "client-cert.pem",
        }
    }

    /// Whether the artifact holds private key material.
    pub fn is_secret(&self) -> bool {
        matches!(self, ArtifactKind::Key | ArtifactKind::ClientKey)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Directory holding a node credential set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    dir: PathBuf,
}

impl ArtifactLayout {
    /// Create a layout rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The credential directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a given artifact.
    pub fn path(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    pub fn key(&self) -> PathBuf {
        self.path(ArtifactKind::Key)
    }

    pub fn cert(&self) -> PathBuf {
        self.path(ArtifactKind::Cert)
    }

    pub fn ca_chain(&self) -> PathBuf {
        self.path(ArtifactKind::CaChain)
    }

    pub fn root_ca(&self) -> PathBuf {
        self.path(ArtifactKind::RootCa)
    }

    pub fn client_key(&self) -> PathBuf {
        self.path(ArtifactKind::ClientKey)
    }

    pub fn client_cert(&self) -> PathBuf {
        self.path(ArtifactKind::ClientCert)
    }
}
