//! Shared application state.

use std::sync::Arc;

use crate::crypto::CertificateAuthority;
use crate::registry::ApplicationLookup;

/// Issuance rules applied on top of registry authorization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssuancePolicy {
    /// Only sign CSRs whose Common Name equals the peer's application id.
    pub require_cn_match: bool,
}

/// State shared by every credential request.
///
/// Built once at startup; the CA is read-only apart from its internal serial
/// counter, and the registry client is safe for concurrent use.
pub struct AppState {
    /// Certificate authority for signing application CSRs.
    pub ca: CertificateAuthority,

    /// Registry used to authorize peers.
    pub registry: Arc<dyn ApplicationLookup>,

    pub policy: IssuancePolicy,
}

impl AppState {
    /// Create a new AppState wrapped in Arc.
    pub fn new(ca: CertificateAuthority, registry: Arc<dyn ApplicationLookup>) -> Arc<Self> {
        Self::with_policy(ca, registry, IssuancePolicy::default())
    }

    /// Create a new AppState with explicit issuance rules.
    pub fn with_policy(
        ca: CertificateAuthority,
        registry: Arc<dyn ApplicationLookup>,
        policy: IssuancePolicy,
    ) -> Arc<Self> {
        Arc::new(Self {
            ca,
            registry,
            policy,
        })
    }
}
