//! Result of an application registry lookup.

use crate::ApplicationId;

/// Outcome of mapping a peer IP address to an application.
///
/// A lookup that completes but yields no application (`found == false`, or
/// an empty identifier) means the peer is not authorized. Transport failures
/// are not represented here; they are errors of the lookup client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    /// Application bound to the address. Empty when nothing was found.
    pub application_id: ApplicationId,

    /// Whether the registry knows the address.
    pub found: bool,
}

impl LookupResult {
    /// Build a result from the identifier returned by the registry.
    ///
    /// The registry signals "unknown address" with an empty identifier.
    pub fn from_application_id(id: impl Into<ApplicationId>) -> Self {
        let application_id = id.into();
        let found = !application_id.is_empty();
        Self {
            application_id,
            found,
        }
    }

    /// A definitive "not found" answer.
    pub fn not_found() -> Self {
        Self {
            application_id: ApplicationId::new(""),
            found: false,
        }
    }

    /// Whether this result authorizes the peer.
    pub fn is_authorized(&self) -> bool {
        self.found && !self.application_id.is_empty()
    }
}
